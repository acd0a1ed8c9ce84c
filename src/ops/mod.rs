pub mod permission_ops;
pub mod account_ops;
pub mod contact_ops;
pub mod comment_ops;
pub mod task_ops;
