pub mod logout_on_terminate;

#[cfg(test)]
pub(crate) mod test_support;
