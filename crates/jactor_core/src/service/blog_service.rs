//! Blog use-case service.
//!
//! # Invariants
//! - Entries created through `create_entry` are attributed to their creator
//!   name, not to the handler's actor.

use crate::model::blog::{Blog, BlogEntry, CreateBlogEntry, UpdateBlogTitle};
use crate::model::persistent::{Persistable, RecordId};
use crate::repo::blog_repo::{BlogEntryRepository, BlogRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::persistence_handler::PersistenceHandler;

pub struct BlogService<B: BlogRepository, E: BlogEntryRepository> {
    blogs: B,
    entries: E,
    handler: PersistenceHandler,
}

impl<B: BlogRepository, E: BlogEntryRepository> BlogService<B, E> {
    pub fn new(blogs: B, entries: E, handler: PersistenceHandler) -> Self {
        Self {
            blogs,
            entries,
            handler,
        }
    }

    pub fn create_entry(&self, command: CreateBlogEntry) -> RepoResult<BlogEntry> {
        let handler = self.handler.with_actor(command.creator_name.as_str());
        let entry = BlogEntry::new(Some(command.blog_id), command.creator_name, command.entry);
        handler.save(&self.entries, entry)
    }

    pub fn find(&self, id: RecordId) -> RepoResult<Option<Blog>> {
        self.blogs.fetch_by_id(id)
    }

    pub fn find_blogs_by_title(&self, title: &str) -> RepoResult<Vec<Blog>> {
        self.blogs.find_by_title(title)
    }

    pub fn find_entries_for_blog(&self, blog_id: RecordId) -> RepoResult<Vec<BlogEntry>> {
        self.entries.find_by_blog_id(blog_id)
    }

    pub fn find_entry(&self, id: RecordId) -> RepoResult<Option<BlogEntry>> {
        self.entries.fetch_by_id(id)
    }

    pub fn save_or_update(&self, blog: Blog) -> RepoResult<Blog> {
        self.handler.save(&self.blogs, blog)
    }

    pub fn save_or_update_entry(&self, entry: BlogEntry) -> RepoResult<BlogEntry> {
        self.handler.save(&self.entries, entry)
    }

    /// Renames a stored blog.
    ///
    /// # Errors
    /// - [`RepoError::NotFound`] when no blog has `command.blog_id`.
    pub fn update_title(&self, command: UpdateBlogTitle) -> RepoResult<Blog> {
        let mut blog = self
            .blogs
            .fetch_by_id(command.blog_id)?
            .ok_or(RepoError::NotFound {
                entity: Blog::ENTITY,
                id: command.blog_id,
            })?;
        blog.title = command.title;
        self.handler.save(&self.blogs, blog)
    }
}
