mod inbox_dto;

pub use inbox_dto::*;
