use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::client::api::FetchError;
use crate::client::comments::CommentsClient;
use crate::client::posts::PostsClient;
use crate::models::comment::Comment;
use crate::models::post::Post;

#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub error: Option<String>,
    pub loading: bool,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self { items: Vec::new(), error: None, loading: false }
    }
}

/// View state shared by the feed and the comment threads.
struct ViewCell<T> {
    view: Mutex<ListView<T>>,
    unmounted: AtomicBool,
}

impl<T: Clone> ViewCell<T> {
    fn new() -> Self {
        Self { view: Mutex::new(ListView::default()), unmounted: AtomicBool::new(false) }
    }

    fn update(&self, f: impl FnOnce(&mut ListView<T>)) {
        if self.unmounted.load(Ordering::SeqCst) {
            return;
        }
        f(&mut self.view.lock().unwrap_or_else(PoisonError::into_inner));
    }

    fn snapshot(&self) -> ListView<T> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn unmount(&self) {
        self.unmounted.store(true, Ordering::SeqCst);
    }
}

/// Post feed: list, then create-and-refetch. A create finishes before the
/// refresh that shows it starts.
pub struct FeedState {
    posts: PostsClient,
    cell: ViewCell<Post>,
}

impl FeedState {
    pub fn new(posts: PostsClient) -> Self {
        Self { posts, cell: ViewCell::new() }
    }

    pub async fn refresh(&self) {
        self.cell.update(|v| v.loading = true);
        let fetched = self.posts.list().await;
        self.cell.update(|v| {
            v.items = fetched.items;
            v.error = fetched.error.map(|e| e.to_string());
            v.loading = false;
        });
    }

    pub async fn create(
        &self,
        content: Option<&str>,
        image_url: Option<&str>,
        user_id: &str,
    ) -> Result<Post, FetchError> {
        match self.posts.create(content, image_url, user_id).await {
            Ok(post) => {
                self.refresh().await;
                Ok(post)
            }
            Err(e) => {
                self.cell.update(|v| v.error = Some(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn view(&self) -> ListView<Post> {
        self.cell.snapshot()
    }

    pub fn unmount(&self) {
        self.cell.unmount();
    }
}

/// Comments under one post.
pub struct CommentThread {
    post_id: String,
    comments: CommentsClient,
    cell: ViewCell<Comment>,
}

impl CommentThread {
    pub fn new(comments: CommentsClient, post_id: &str) -> Self {
        Self { post_id: post_id.to_string(), comments, cell: ViewCell::new() }
    }

    pub async fn refresh(&self) {
        self.cell.update(|v| v.loading = true);
        let fetched = self.comments.list_by_post(&self.post_id).await;
        self.cell.update(|v| {
            v.items = fetched.items;
            v.error = fetched.error.map(|e| e.to_string());
            v.loading = false;
        });
    }

    pub async fn create(
        &self,
        content: &str,
        image_url: Option<&str>,
        user_id: &str,
    ) -> Result<Comment, FetchError> {
        match self.comments.create(&self.post_id, content, image_url, user_id).await {
            Ok(comment) => {
                self.refresh().await;
                Ok(comment)
            }
            Err(e) => {
                self.cell.update(|v| v.error = Some(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn view(&self) -> ListView<Comment> {
        self.cell.snapshot()
    }

    pub fn unmount(&self) {
        self.cell.unmount();
    }
}
