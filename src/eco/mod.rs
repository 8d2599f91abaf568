pub mod aggregate;
pub mod audit;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod ledger;
pub mod paths;
pub mod persist;
pub mod session;
pub mod storage;
pub mod util;
pub mod warn;
