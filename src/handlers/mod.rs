/// HTTP request handlers
///
/// Two surfaces over the same services: browser-facing routes (`pages`,
/// `posts`, `social`) that keep the original navigation contract (redirects,
/// page-numbered feeds), and the versioned REST API under `/v1/` (`api`,
/// `auth`).
pub mod api;
pub mod auth;
pub mod pages;
pub mod posts;
pub mod social;

use actix_web::web;

/// Wire every route. Order matters for the browser routes: the literal
/// prefixes must be registered before the `/{username}/...` catch-alls.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            .route("/token/", web::post().to(auth::obtain_token))
            .route("/token/refresh/", web::post().to(auth::refresh_token))
            .service(
                web::scope("/posts")
                    .route("/", web::get().to(api::posts::list_posts))
                    .route("/", web::post().to(api::posts::create_post))
                    .service(
                        web::scope("/{post_id}/comments")
                            .route("/", web::get().to(api::comments::list_comments))
                            .route("/", web::post().to(api::comments::create_comment))
                            .route("/{comment_id}/", web::get().to(api::comments::get_comment))
                            .route(
                                "/{comment_id}/",
                                web::put().to(api::comments::update_comment),
                            )
                            .route(
                                "/{comment_id}/",
                                web::patch().to(api::comments::update_comment),
                            )
                            .route(
                                "/{comment_id}/",
                                web::delete().to(api::comments::delete_comment),
                            ),
                    )
                    .service(
                        web::scope("/{post_id}/likes")
                            .route("/", web::get().to(api::likes::list_likes))
                            .route("/", web::post().to(api::likes::create_like))
                            .route("/", web::delete().to(api::likes::delete_like)),
                    )
                    .route("/{post_id}/", web::get().to(api::posts::get_post))
                    .route("/{post_id}/", web::put().to(api::posts::update_post))
                    .route("/{post_id}/", web::patch().to(api::posts::update_post))
                    .route("/{post_id}/", web::delete().to(api::posts::delete_post)),
            )
            .service(
                web::scope("/group")
                    .route("/", web::get().to(api::groups::list_groups))
                    .route("/", web::post().to(api::groups::create_group)),
            )
            .service(
                web::scope("/follow")
                    .route("/", web::get().to(api::follows::list_follows))
                    .route("/", web::post().to(api::follows::create_follow)),
            ),
    );

    // Browser-facing routes, most specific first.
    cfg.route("/", web::get().to(pages::index))
        .route("/new/", web::post().to(posts::new_post))
        .route("/follow/", web::get().to(pages::follow_index))
        .route("/liked/", web::get().to(pages::liked_index))
        .route("/group/{slug}/", web::get().to(pages::group_feed))
        .route("/{post_id}/like/", web::get().to(social::post_like))
        .route("/{post_id}/unlike/", web::get().to(social::post_unlike))
        .route("/{username}/follow/", web::get().to(social::profile_follow))
        .route(
            "/{username}/unfollow/",
            web::get().to(social::profile_unfollow),
        )
        .route(
            "/{username}/{post_id}/edit/",
            web::post().to(posts::edit_post),
        )
        .route(
            "/{username}/{post_id}/delete/",
            web::post().to(posts::delete_post),
        )
        .route(
            "/{username}/{post_id}/comment/",
            web::post().to(posts::add_comment),
        )
        .route("/{username}/{post_id}/", web::get().to(pages::post_detail))
        .route("/{username}/", web::get().to(pages::profile));
}
