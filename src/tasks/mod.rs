pub mod abandoned_carts;
