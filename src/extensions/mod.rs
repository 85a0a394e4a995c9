pub mod iterator_ext;
