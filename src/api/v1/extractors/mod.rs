mod authorized;

pub use authorized::Authorized;
