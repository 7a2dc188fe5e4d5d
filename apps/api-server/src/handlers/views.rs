//! Domain records to response bodies.

use blogicum_core::Page;
use blogicum_core::domain::{Category, CommentWithAuthor, Location, Post, PostSummary, User};
use blogicum_shared::Paged;
use blogicum_shared::dto::{
    CategoryResponse, CommentResponse, LocationResponse, PostCard, PostDetailResponse,
    ProfileResponse,
};
use blogicum_shared::forms::{PostForm, ProfileForm};

pub fn paged<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> Paged<U> {
    let num_pages = page.num_pages();
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    let page = page.map(f);
    Paged {
        items: page.items,
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        num_pages,
        has_next,
        has_previous,
    }
}

/// Public URL of a stored image.
pub fn image_url(media_url: &str, image: Option<&str>) -> Option<String> {
    image.map(|path| format!("{}/{}", media_url.trim_end_matches('/'), path))
}

pub fn post_card(summary: PostSummary, media_url: &str) -> PostCard {
    let post = summary.post;
    PostCard {
        image_url: image_url(media_url, post.image.as_deref()),
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        is_published: post.is_published,
        author: summary.author_username,
        category_id: post.category_id,
        location_id: post.location_id,
        comment_count: summary.comment_count,
    }
}

pub fn comment_response(entry: CommentWithAuthor) -> CommentResponse {
    CommentResponse {
        id: entry.comment.id,
        text: entry.comment.text,
        author: entry.author_username,
        created_at: entry.comment.created_at,
    }
}

pub fn category_response(category: &Category) -> CategoryResponse {
    CategoryResponse {
        title: category.title.clone(),
        description: category.description.clone(),
        slug: category.slug.clone(),
    }
}

/// Unpublished locations are left off the detail page.
fn location_response(location: &Location) -> Option<LocationResponse> {
    location.is_published.then(|| LocationResponse {
        name: location.name.clone(),
    })
}

pub struct PostDetailParts {
    pub post: Post,
    pub author: Option<User>,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comments: Vec<CommentWithAuthor>,
}

pub fn post_detail(parts: PostDetailParts, media_url: &str) -> PostDetailResponse {
    let PostDetailParts {
        post,
        author,
        category,
        location,
        comments,
    } = parts;

    PostDetailResponse {
        image_url: image_url(media_url, post.image.as_deref()),
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        is_published: post.is_published,
        author: author.map(|u| u.username),
        category: category.as_ref().map(category_response),
        location: location.as_ref().and_then(location_response),
        comments: comments.into_iter().map(comment_response).collect(),
    }
}

pub fn profile_response(user: &User) -> ProfileResponse {
    ProfileResponse {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        date_joined: user.created_at,
    }
}

/// Current values of a post, as the edit form shows them.
pub fn post_form(post: &Post) -> PostForm {
    PostForm {
        title: post.title.clone(),
        text: post.text.clone(),
        pub_date: post.pub_date,
        location_id: post.location_id,
        category_id: post.category_id,
        image: post.image.clone(),
    }
}

pub fn profile_form(user: &User) -> ProfileForm {
    ProfileForm {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: (!user.email.is_empty()).then(|| user.email.clone()),
    }
}
