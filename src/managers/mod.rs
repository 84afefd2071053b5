// linkshelf state managers
// Managers own persistent state: the bookmark store.

pub mod bookmark_manager;
