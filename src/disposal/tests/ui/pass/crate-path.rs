extern crate disposal as renamed;

use renamed::method::Disposers;

pub struct Widget;

pub struct Factory;

#[renamed::disposers(crate = ::renamed)]
impl Factory {
    #[disposer]
    fn dispose(&self, #[disposes] _widget: Widget) {}
}

fn main() {
    assert_eq!(Factory::disposal_methods().len(), 1);
}
