mod session;

pub use session::{DualDb, SessionReadQuery, SessionWriteQuery};
