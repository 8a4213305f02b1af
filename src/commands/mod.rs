// Command handlers module
pub mod driver;
pub mod list;
pub mod load;
pub mod version;

// Re-exports for cleaner imports
pub use driver::execute as driver;
pub use list::execute as list;
pub use load::execute as load;
pub use version::execute as version;
