mod business;
pub use business::*;

mod children;
pub use children::*;
