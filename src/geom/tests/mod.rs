mod test_dispatch_basic;
mod test_path_basic;
