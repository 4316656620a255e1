use std::any;
use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use crate::container::{Managed, Receiver};
use crate::method::handle::{Arguments, InvocationError, MethodHandle};

/// A closure standing for a method with a receiver of type `R`.
///
/// Closures of `Fn(&R, A1, A2, ...) -> Result<(), E> + Send + Sync + 'static`
/// where `Ai: Managed` are [`InstanceBody`], up to eight arguments.
pub trait InstanceBody<R, D>: Send + Sync + 'static
where
    R: Managed,
    D: 'static,
{
    const ARITY: usize;

    /// Takes the arguments out of `arguments` in order and calls `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument has the wrong type, or the inner error
    /// of the closure wrapped in [`InvocationError::Body`].
    fn call(&self, receiver: &R, arguments: Arguments) -> Result<(), InvocationError>;
}

/// A closure standing for a method without a receiver.
///
/// Closures of `Fn(A1, A2, ...) -> Result<(), E> + Send + Sync + 'static`
/// where `Ai: Managed` are [`StaticBody`], up to eight arguments.
pub trait StaticBody<D>: Send + Sync + 'static
where
    D: 'static,
{
    const ARITY: usize;

    /// Takes the arguments out of `arguments` in order and calls `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument has the wrong type, or the inner error
    /// of the closure wrapped in [`InvocationError::Body`].
    fn call(&self, arguments: Arguments) -> Result<(), InvocationError>;
}

macro_rules! for_all_tuples {
    ($implementation:ident) => {
        $implementation!();
        $implementation!(A1);
        $implementation!(A1, A2);
        $implementation!(A1, A2, A3);
        $implementation!(A1, A2, A3, A4);
        $implementation!(A1, A2, A3, A4, A5);
        $implementation!(A1, A2, A3, A4, A5, A6);
        $implementation!(A1, A2, A3, A4, A5, A6, A7);
        $implementation!(A1, A2, A3, A4, A5, A6, A7, A8);
    };
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $(, $tail:ident)*) => { 1usize + count!($($tail),*) };
}

macro_rules! impl_bodies {
    ($($arg:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, R, E, $($arg,)*> InstanceBody<R, ($($arg,)*)> for F
        where
            F: Fn(&R, $($arg,)*) -> Result<(), E> + Send + Sync + 'static,
            R: Managed,
            E: Into<Box<dyn Error + Send + Sync>>,
            $($arg: Managed,)*
        {
            const ARITY: usize = count!($($arg),*);

            fn call(&self, receiver: &R, mut arguments: Arguments) -> Result<(), InvocationError> {
                arguments.expect_len(<Self as InstanceBody<R, ($($arg,)*)>>::ARITY)?;
                $(
                    let $arg = arguments.next::<$arg>()?;
                )*
                self(receiver, $($arg,)*).map_err(|err| InvocationError::Body { source: err.into() })
            }
        }

        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, E, $($arg,)*> StaticBody<($($arg,)*)> for F
        where
            F: Fn($($arg,)*) -> Result<(), E> + Send + Sync + 'static,
            E: Into<Box<dyn Error + Send + Sync>>,
            $($arg: Managed,)*
        {
            const ARITY: usize = count!($($arg),*);

            fn call(&self, mut arguments: Arguments) -> Result<(), InvocationError> {
                arguments.expect_len(<Self as StaticBody<($($arg,)*)>>::ARITY)?;
                $(
                    let $arg = arguments.next::<$arg>()?;
                )*
                self($($arg,)*).map_err(|err| InvocationError::Body { source: err.into() })
            }
        }
    };
}

for_all_tuples!(impl_bodies);

/// A [`MethodHandle`] calling an [`InstanceBody`] on a receiver of type `R`.
///
/// # Examples
///
/// ```rust
/// # use std::convert::Infallible;
/// # use disposal::method::InstanceMethod;
/// struct Pool;
/// struct Connection;
///
/// impl Pool {
///     fn release(&self, _connection: Connection) {}
/// }
///
/// let handle = InstanceMethod::new(|pool: &Pool, connection: Connection| {
///     pool.release(connection);
///     Ok::<_, Infallible>(())
/// });
/// ```
pub struct InstanceMethod<R, B, D>
where
    R: Managed,
    B: InstanceBody<R, D>,
    D: 'static,
{
    body: B,
    _marker: PhantomData<fn(&R, D)>,
}

impl<R, B, D> InstanceMethod<R, B, D>
where
    R: Managed,
    B: InstanceBody<R, D>,
    D: 'static,
{
    pub fn new(body: B) -> Self {
        Self {
            body,
            _marker: PhantomData,
        }
    }
}

impl<R, B, D> Debug for InstanceMethod<R, B, D>
where
    R: Managed,
    B: InstanceBody<R, D>,
    D: 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InstanceMethod")
            .field("receiver", &any::type_name::<R>())
            .field("arity", &B::ARITY)
            .finish_non_exhaustive()
    }
}

impl<R, B, D> MethodHandle for InstanceMethod<R, B, D>
where
    R: Managed,
    B: InstanceBody<R, D>,
    D: 'static,
{
    fn requires_receiver(&self) -> bool {
        true
    }

    fn invoke(
        &self,
        receiver: Option<&Receiver>,
        arguments: Arguments,
    ) -> Result<(), InvocationError> {
        let Some(receiver) = receiver else {
            return Err(InvocationError::MissingReceiver);
        };
        let Some(instance) = receiver.downcast_ref::<R>() else {
            return Err(InvocationError::ReceiverMismatch {
                expected: any::type_name::<R>(),
                found: receiver.type_name(),
            });
        };
        self.body.call(instance, arguments)
    }
}

/// A [`MethodHandle`] calling a [`StaticBody`]. A receiver, if given anyway,
/// is ignored.
pub struct StaticMethod<B, D>
where
    B: StaticBody<D>,
    D: 'static,
{
    body: B,
    _marker: PhantomData<fn(D)>,
}

impl<B, D> StaticMethod<B, D>
where
    B: StaticBody<D>,
    D: 'static,
{
    pub fn new(body: B) -> Self {
        Self {
            body,
            _marker: PhantomData,
        }
    }
}

impl<B, D> Debug for StaticMethod<B, D>
where
    B: StaticBody<D>,
    D: 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StaticMethod")
            .field("arity", &B::ARITY)
            .finish_non_exhaustive()
    }
}

impl<B, D> MethodHandle for StaticMethod<B, D>
where
    B: StaticBody<D>,
    D: 'static,
{
    fn requires_receiver(&self) -> bool {
        false
    }

    fn invoke(
        &self,
        _receiver: Option<&Receiver>,
        arguments: Arguments,
    ) -> Result<(), InvocationError> {
        self.body.call(arguments)
    }
}
