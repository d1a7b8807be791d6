mod business;
pub use business::*;

mod contact;
pub use contact::*;

mod schedule;
pub use schedule::*;

mod update;
pub use update::*;

mod view;
pub use view::*;

mod validation;
pub use validation::*;
