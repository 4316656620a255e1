use std::any;
use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use snafu::prelude::*;

use crate::container::{Managed, Receiver};
use crate::util::any::Downcast;
use crate::util::name::abbreviate;

/// The method-invocation layer: calls a method given an optional receiver
/// and a complete, ordered argument list.
///
/// Usually you don't implement this by hand; wrap a closure in an
/// [`InstanceMethod`] or a [`StaticMethod`] instead.
///
/// [`InstanceMethod`]: crate::method::InstanceMethod
/// [`StaticMethod`]: crate::method::StaticMethod
pub trait MethodHandle: Send + Sync + 'static {
    /// Returns false if the method can be called without a receiver.
    fn requires_receiver(&self) -> bool;

    /// Calls the method.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments or the receiver don't fit the
    /// method, or if the method body itself fails.
    fn invoke(
        &self,
        receiver: Option<&Receiver>,
        arguments: Arguments,
    ) -> Result<(), InvocationError>;
}

/// A fixed-size, ordered list of type-erased arguments.
pub struct Arguments {
    slots: Vec<Option<Box<dyn Managed>>>,
    cursor: usize,
}

impl Arguments {
    pub fn new(values: Vec<Box<dyn Managed>>) -> Self {
        Self {
            slots: values.into_iter().map(Some).collect(),
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn expect_len(&self, expected: usize) -> Result<(), InvocationError> {
        ensure!(
            self.slots.len() == expected,
            ArgumentCountSnafu {
                expected,
                found: self.slots.len(),
            }
        );
        Ok(())
    }

    /// Type names of the arguments that haven't been taken yet.
    pub fn type_names(&self) -> Vec<Option<&'static str>> {
        self.slots
            .iter()
            .map(|slot| slot.as_ref().map(|object| (**object).type_name()))
            .collect()
    }

    /// Takes the argument at `position` out of the list.
    pub fn take<T: Managed>(&mut self, position: usize) -> Result<T, InvocationError> {
        let Some(object) = self.slots.get_mut(position).and_then(Option::take) else {
            return MissingArgumentSnafu { position }.fail();
        };
        match object.downcast::<T>() {
            Ok(object) => Ok(*object),
            Err(object) => ArgumentMismatchSnafu {
                position,
                expected: any::type_name::<T>(),
                found: (*object).type_name(),
            }
            .fail(),
        }
    }

    /// Takes the argument following the one taken by the previous call.
    pub fn next<T: Managed>(&mut self) -> Result<T, InvocationError> {
        let position = self.cursor;
        self.cursor += 1;
        self.take(position)
    }
}

impl Debug for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_list().entries(self.type_names()).finish()
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InvocationError {
    #[snafu(display("expected {expected} arguments, found {found}"))]
    #[non_exhaustive]
    ArgumentCount { expected: usize, found: usize },
    #[snafu(display("argument #{position} is missing or already taken"))]
    #[non_exhaustive]
    MissingArgument { position: usize },
    #[snafu(display(
        "argument #{position} should be a {}, found a {}",
        abbreviate(expected),
        abbreviate(found)
    ))]
    #[non_exhaustive]
    ArgumentMismatch {
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[snafu(display("the method needs a receiver but none was resolved"))]
    #[non_exhaustive]
    MissingReceiver,
    #[snafu(display(
        "the receiver should be a {}, found a {}",
        abbreviate(expected),
        abbreviate(found)
    ))]
    #[non_exhaustive]
    ReceiverMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[snafu(display("the method body failed"))]
    #[non_exhaustive]
    Body {
        source: Box<dyn Error + Send + Sync>,
    },
}

impl InvocationError {
    /// Returns true if the error comes from the arguments or receiver rather
    /// than from the method body.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, Self::Body { .. })
    }
}
