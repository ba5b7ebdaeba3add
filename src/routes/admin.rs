use askama::Template;
use axum::extract::{Multipart, Path, State};
use axum::response::{Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::{Flash, FlashLevel};
use crate::db::models::{parse_row_id, ContentSection, ContentUpdate, SectionKey};
use crate::db::{announcements, content, features, gallery};
use crate::error::AppResult;
use crate::extractors::AdminContext;
use crate::routes::Html;
use crate::state::AppState;
use crate::uploads::{self, UploadOutcome, UploadRejection};

// --- View structs ---

pub struct SectionSummary {
    pub section: String,
    pub title: String,
}

/// Content section with nullable columns flattened for form inputs.
pub struct ContentFormView {
    pub section: String,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub highlight: String,
    pub image: String,
    pub extra_info: String,
}

impl From<ContentSection> for ContentFormView {
    fn from(c: ContentSection) -> Self {
        Self {
            section: c.section,
            title: c.title.unwrap_or_default(),
            subtitle: c.subtitle.unwrap_or_default(),
            body: c.body.unwrap_or_default(),
            highlight: c.highlight.unwrap_or_default(),
            image: c.image.unwrap_or_default(),
            extra_info: c.extra_info.unwrap_or_default(),
        }
    }
}

pub struct GalleryRow {
    pub id: i64,
    pub file_path: String,
    pub caption: String,
    pub display_order: i64,
    pub created_at: String,
}

// --- Templates ---

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub flashes: Vec<Flash>,
    pub username: String,
    pub sections: Vec<SectionSummary>,
    pub gallery_count: usize,
    pub feature_count: usize,
    pub announcement_count: usize,
}

#[derive(Template)]
#[template(path = "admin/edit_content.html")]
pub struct EditContentTemplate {
    pub flashes: Vec<Flash>,
    pub username: String,
    pub content: ContentFormView,
}

#[derive(Template)]
#[template(path = "admin/manage_gallery.html")]
pub struct GalleryTemplate {
    pub flashes: Vec<Flash>,
    pub username: String,
    pub images: Vec<GalleryRow>,
}

#[derive(Template)]
#[template(path = "admin/manage_features.html")]
pub struct FeaturesTemplate {
    pub flashes: Vec<Flash>,
    pub username: String,
    pub features: Vec<crate::db::models::Feature>,
}

#[derive(Template)]
#[template(path = "admin/manage_announcements.html")]
pub struct AnnouncementsTemplate {
    pub flashes: Vec<Flash>,
    pub username: String,
    pub announcements: Vec<crate::db::models::Announcement>,
}

// --- Forms ---

#[derive(Deserialize)]
pub struct FeatureForm {
    pub action: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub feature_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AnnouncementForm {
    pub action: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub announcement_id: Option<String>,
}

/// Fields of the gallery's multipart form.
#[derive(Default)]
pub struct GallerySubmission {
    pub action: Option<String>,
    pub image_id: Option<String>,
    pub caption: Option<String>,
    pub file_name: Option<String>,
    pub file_data: Vec<u8>,
}

impl GallerySubmission {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut submission = GallerySubmission::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    submission.file_name = field.file_name().map(str::to_string);
                    submission.file_data = field.bytes().await?.to_vec();
                }
                "action" => submission.action = Some(field.text().await?),
                "image_id" => submission.image_id = Some(field.text().await?),
                "caption" => submission.caption = Some(field.text().await?),
                _ => {}
            }
        }
        Ok(submission)
    }

    fn caption(&self) -> Option<&str> {
        self.caption
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route(
            "/admin/content/{section}",
            get(edit_content).post(update_content),
        )
        .route("/admin/gallery", get(gallery_page).post(gallery_submit))
        .route("/admin/features", get(features_page).post(features_submit))
        .route(
            "/admin/announcements",
            get(announcements_page).post(announcements_submit),
        )
}

// --- Handlers ---

async fn dashboard(State(state): State<AppState>, mut admin: AdminContext) -> AppResult<Response> {
    let sections = content::list_content_sections(&state.db)?
        .into_iter()
        .map(|c| SectionSummary {
            section: c.section,
            title: c.title.unwrap_or_default(),
        })
        .collect();
    let gallery_count = gallery::list_gallery_images(&state.db, None)?.len();
    let feature_count = features::list_features(&state.db)?.len();
    let announcement_count = announcements::list_announcements(&state.db)?.len();

    let flashes = admin.ctx.take_flashes();
    let template = DashboardTemplate {
        flashes,
        username: admin.user.username.clone(),
        sections,
        gallery_count,
        feature_count,
        announcement_count,
    };
    admin.ctx.finish(Html(template)).await
}

async fn section_not_found(mut admin: AdminContext) -> AppResult<Response> {
    admin.ctx.flash(FlashLevel::Danger, "セクションが見つかりません。");
    admin.ctx.finish(Redirect::to("/admin")).await
}

async fn edit_content(
    State(state): State<AppState>,
    mut admin: AdminContext,
    Path(section): Path<String>,
) -> AppResult<Response> {
    let Some(content) = content::get_content_section(&state.db, &section)? else {
        return section_not_found(admin).await;
    };

    let flashes = admin.ctx.take_flashes();
    let template = EditContentTemplate {
        flashes,
        username: admin.user.username.clone(),
        content: content.into(),
    };
    admin.ctx.finish(Html(template)).await
}

async fn update_content(
    State(state): State<AppState>,
    mut admin: AdminContext,
    Path(section): Path<String>,
    Form(update): Form<ContentUpdate>,
) -> AppResult<Response> {
    let Ok(key) = section.parse::<SectionKey>() else {
        return section_not_found(admin).await;
    };
    if content::get_content_section(&state.db, key.as_str())?.is_none() {
        return section_not_found(admin).await;
    }

    content::update_content_section(&state.db, key, &update)?;
    tracing::info!("Section '{}' updated by {}", key, admin.user.username);

    admin.ctx.flash(FlashLevel::Success, "更新しました。");
    admin
        .ctx
        .finish(Redirect::to(&format!("/admin/content/{}", key)))
        .await
}

async fn gallery_page(State(state): State<AppState>, mut admin: AdminContext) -> AppResult<Response> {
    let images = gallery::list_gallery_images(&state.db, None)?
        .into_iter()
        .map(|img| GalleryRow {
            id: img.id,
            file_path: img.file_path,
            caption: img.caption.unwrap_or_default(),
            display_order: img.display_order,
            created_at: img.created_at,
        })
        .collect();

    let flashes = admin.ctx.take_flashes();
    let template = GalleryTemplate {
        flashes,
        username: admin.user.username.clone(),
        images,
    };
    admin.ctx.finish(Html(template)).await
}

async fn gallery_submit(
    State(state): State<AppState>,
    mut admin: AdminContext,
    multipart: Multipart,
) -> AppResult<Response> {
    let submission = GallerySubmission::read(multipart).await?;

    if submission.action.as_deref() == Some("delete") {
        gallery::delete_gallery_image(&state.db, parse_row_id(submission.image_id.as_deref()))?;
        admin.ctx.flash(FlashLevel::Info, "画像を削除しました。");
    } else {
        let outcome = uploads::store_image(
            &state.config.uploads_path(),
            submission.file_name.as_deref(),
            &submission.file_data,
        )
        .await?;
        match outcome {
            UploadOutcome::Stored { public_path, .. } => {
                gallery::add_gallery_image(&state.db, &public_path, submission.caption())?;
                admin.ctx.flash(FlashLevel::Success, "ギャラリーを更新しました。");
            }
            UploadOutcome::Rejected(UploadRejection::MissingFile) => {
                admin.ctx.flash(FlashLevel::Warning, "画像ファイルを選択してください。");
            }
            UploadOutcome::Rejected(UploadRejection::UnsupportedType) => {
                admin.ctx.flash(
                    FlashLevel::Warning,
                    "アップロードできるのは png・jpg・jpeg・gif・webp 形式の画像のみです。",
                );
            }
        }
    }

    admin.ctx.finish(Redirect::to("/admin/gallery")).await
}

async fn features_page(State(state): State<AppState>, mut admin: AdminContext) -> AppResult<Response> {
    let features = features::list_features(&state.db)?;
    let flashes = admin.ctx.take_flashes();
    let template = FeaturesTemplate {
        flashes,
        username: admin.user.username.clone(),
        features,
    };
    admin.ctx.finish(Html(template)).await
}

async fn features_submit(
    State(state): State<AppState>,
    mut admin: AdminContext,
    Form(form): Form<FeatureForm>,
) -> AppResult<Response> {
    match form.action.as_deref() {
        Some("add") => {
            let added = features::add_feature(
                &state.db,
                form.title.as_deref(),
                form.description.as_deref(),
                form.icon.as_deref(),
            )?;
            if added {
                admin.ctx.flash(FlashLevel::Success, "ハイライトを追加しました。");
            } else {
                admin
                    .ctx
                    .flash(FlashLevel::Warning, "タイトルと説明を入力してください。");
            }
        }
        Some("delete") => {
            features::delete_feature(&state.db, parse_row_id(form.feature_id.as_deref()))?;
            admin.ctx.flash(FlashLevel::Info, "ハイライトを削除しました。");
        }
        _ => {}
    }

    admin.ctx.finish(Redirect::to("/admin/features")).await
}

async fn announcements_page(
    State(state): State<AppState>,
    mut admin: AdminContext,
) -> AppResult<Response> {
    let announcements = announcements::list_announcements(&state.db)?;
    let flashes = admin.ctx.take_flashes();
    let template = AnnouncementsTemplate {
        flashes,
        username: admin.user.username.clone(),
        announcements,
    };
    admin.ctx.finish(Html(template)).await
}

async fn announcements_submit(
    State(state): State<AppState>,
    mut admin: AdminContext,
    Form(form): Form<AnnouncementForm>,
) -> AppResult<Response> {
    match form.action.as_deref() {
        Some("add") => {
            let added = announcements::add_announcement(
                &state.db,
                form.title.as_deref(),
                form.content.as_deref(),
            )?;
            if added {
                admin.ctx.flash(FlashLevel::Success, "お知らせを追加しました。");
            } else {
                admin
                    .ctx
                    .flash(FlashLevel::Warning, "タイトルと本文を入力してください。");
            }
        }
        Some("delete") => {
            announcements::delete_announcement(
                &state.db,
                parse_row_id(form.announcement_id.as_deref()),
            )?;
            admin.ctx.flash(FlashLevel::Info, "お知らせを削除しました。");
        }
        _ => {}
    }

    admin.ctx.finish(Redirect::to("/admin/announcements")).await
}
