pub mod key_list;
