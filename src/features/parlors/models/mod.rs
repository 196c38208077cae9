mod parlor;

pub use parlor::Parlor;
