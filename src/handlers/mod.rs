// HTTP handlers, grouped by route family.
//
// Every handler returns `ApiResult<T>` so success and failure both flow
// through the response envelope in `crate::response` / `crate::error`.

pub mod auth;
pub mod docs;
pub mod dog;
pub mod health;
pub mod root;
pub mod user;
