pub mod caption_store;
