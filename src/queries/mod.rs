pub mod paging;
pub mod contact_queries;
