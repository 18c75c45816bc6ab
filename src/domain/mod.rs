pub mod model;
pub mod session;
pub mod validation;
pub mod weekday;
