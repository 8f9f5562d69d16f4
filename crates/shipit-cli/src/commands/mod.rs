mod doctor;
mod inspect;
mod package;

pub use doctor::doctor;
pub use inspect::inspect;
pub use package::package;
