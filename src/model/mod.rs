pub mod ids;
pub mod user;
pub mod permission;
pub mod address;
pub mod contact;
pub mod account;
pub mod opportunity;
pub mod lead;
pub mod task;
pub mod comment;

// Re-exports for convenience
pub use ids::Id;
pub use user::User;
pub use permission::{Access, AccessRequest, Asset, Permission};
pub use address::{Address, AddressType};
pub use contact::{
    Contact, ContactAttributes, ContactParams, ContactSort, ConversionParams, FullNameFormat,
};
pub use account::{Account, AccountContact, AccountParams};
pub use opportunity::{ContactOpportunity, Opportunity};
pub use lead::Lead;
pub use task::{Activity, Task};
pub use comment::Comment;
