use disposal::prelude::*;

pub trait Resource {}

pub struct Widget;

impl Resource for Widget {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    North,
}

pub struct Warehouse;

#[disposers]
impl Warehouse {
    #[disposer]
    pub fn store(
        &self,
        #[disposes]
        #[assignable_to(dyn Resource, dyn std::any::Any)]
        _widget: Widget,
        #[qualified(Region::North)] _region: Region,
        #[named("a")]
        #[named("b")]
        _tags: Vec<String>,
        _a: u8,
        _b: u16,
        _c: u32,
        _d: u64,
    ) {
    }

    #[disposer]
    pub fn scrap(#[disposes] _widget: Widget, mut _count: u32) {}

    pub fn not_a_disposer(&mut self, _widget: &Widget) {}
}

fn main() {
    let methods = Warehouse::disposal_methods();
    assert_eq!(methods.len(), 2);
    assert_eq!(methods[0].parameters().len(), 7);
}
