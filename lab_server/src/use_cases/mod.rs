pub mod list_sessions;
pub mod logout;
pub mod register;
#[cfg(test)]
pub(crate) mod test_support;
