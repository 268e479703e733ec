//! The multipart item form shared by the create and edit endpoints.

use axum::extract::Multipart;
use maud::{Markup, html};

use crate::{
    Error,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, loading_spinner, text_input,
    },
    i18n::Language,
    image_ingest::ImageIngestor,
    item::{ImageChange, Item, ItemDraft, ItemTitle},
};

/// The fields of a submitted item form.
///
/// Field names follow the stored item: `tipo`, `marca` and `cor` hold the
/// kind, brand and colour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct ItemForm {
    pub title: String,
    pub notes: String,
    pub kind: String,
    pub brand: String,
    pub colour: String,
    /// The raw bytes of a newly chosen photo.
    pub photo: Option<Vec<u8>>,
    pub remove_photo: bool,
}

impl ItemForm {
    /// Read the form from a `multipart/form-data` body.
    ///
    /// Unknown fields are ignored and an empty file field means no new photo.
    pub(super) async fn read(mut multipart: Multipart) -> Result<Self, Error> {
        let mut form = ItemForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|error| Error::MultipartError(error.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_owned();

            if name == "photo" {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|error| Error::MultipartError(error.to_string()))?;
                if !bytes.is_empty() {
                    form.photo = Some(bytes.to_vec());
                }
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|error| Error::MultipartError(error.to_string()))?;

            match name.as_str() {
                "title" => form.title = text,
                "notes" => form.notes = text,
                "tipo" => form.kind = text,
                "marca" => form.brand = text,
                "cor" => form.colour = text,
                "remove_photo" => form.remove_photo = matches!(text.as_str(), "on" | "true"),
                other => tracing::debug!("Ignoring unknown item form field \"{other}\""),
            }
        }

        Ok(form)
    }

    /// Validate the form and process the photo.
    ///
    /// The photo is decoded, downsized and encoded on the blocking thread pool.
    /// A new photo takes precedence over `remove_photo`.
    ///
    /// # Errors
    ///
    /// - [Error::EmptyItemTitle] if the title is blank.
    /// - [Error::ImageProcessing] if the photo cannot be ingested.
    pub(super) async fn into_draft(self, ingestor: ImageIngestor) -> Result<ItemDraft, Error> {
        let title = ItemTitle::new(&self.title)?;

        let image = match self.photo {
            Some(bytes) => ImageChange::Replace(ingest_photo(ingestor, bytes).await?),
            None if self.remove_photo => ImageChange::Remove,
            None => ImageChange::Keep,
        };

        Ok(ItemDraft {
            title,
            notes: self.notes.trim().to_owned(),
            kind: self.kind.trim().to_owned(),
            brand: self.brand.trim().to_owned(),
            colour: self.colour.trim().to_owned(),
            image,
        })
    }
}

async fn ingest_photo(ingestor: ImageIngestor, bytes: Vec<u8>) -> Result<String, Error> {
    let input_size = bytes.len();

    let data_url = tokio::task::spawn_blocking(move || {
        ingestor.ingest(&bytes).map(|image| image.to_data_url())
    })
    .await
    .map_err(|error| Error::ImageProcessing(error.to_string()))??;

    tracing::debug!(
        "Ingested a {input_size} byte photo into a {} byte data URL",
        data_url.len()
    );

    Ok(data_url)
}

/// The values shown in the item form.
#[derive(Debug, Clone, Default)]
pub(super) struct ItemFormValues {
    pub title: String,
    pub notes: String,
    pub kind: String,
    pub brand: String,
    pub colour: String,
    /// The photo the item has now, if any.
    pub image: Option<String>,
}

impl From<&Item> for ItemFormValues {
    fn from(item: &Item) -> Self {
        Self {
            title: item.title.to_string(),
            notes: item.notes.clone(),
            kind: item.kind.clone(),
            brand: item.brand.clone(),
            colour: item.colour.clone(),
            image: item.image().map(str::to_owned),
        }
    }
}

impl ItemFormValues {
    /// The values of a rejected submission, so the user does not have to
    /// type them again.
    pub(super) fn from_form(form: &ItemForm, image: Option<String>) -> Self {
        Self {
            title: form.title.clone(),
            notes: form.notes.clone(),
            kind: form.kind.clone(),
            brand: form.brand.clone(),
            colour: form.colour.clone(),
            image,
        }
    }
}

/// Where the form is submitted.
pub(super) enum FormTarget<'a> {
    /// `POST` a new item to this URL.
    Create(&'a str),
    /// `PUT` the changes to this URL.
    Update(&'a str),
}

pub(super) fn item_form_view(
    language: Language,
    target: FormTarget,
    values: &ItemFormValues,
    cancel_url: &str,
    error_message: Option<&str>,
) -> Markup {
    let t = |key: &'static str| language.translate(key);
    let (post_url, put_url) = match target {
        FormTarget::Create(url) => (Some(url), None),
        FormTarget::Update(url) => (None, Some(url)),
    };

    html! {
        form
            hx-post=[post_url]
            hx-put=[put_url]
            hx-encoding="multipart/form-data"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-disabled-elt="find button[type=submit]"
            class="stack"
        {
            (text_input("title", t("title"), &values.title, true))
            (text_input("tipo", t("type"), &values.kind, false))
            (text_input("marca", t("brand"), &values.brand, false))
            (text_input("cor", t("color"), &values.colour, false))

            div
            {
                label for="notes" class=(FORM_LABEL_STYLE) { (t("notes")) }
                textarea id="notes" name="notes" rows="4" class=(FORM_TEXT_INPUT_STYLE)
                {
                    (values.notes)
                }
            }

            div
            {
                label for="photo" class=(FORM_LABEL_STYLE) { (t("photo")) }

                @if let Some(image) = &values.image {
                    img src=(image) alt=(values.title) class="photo-preview";

                    label class="checkbox-label"
                    {
                        input type="checkbox" name="remove_photo" value="true";
                        " " (t("remove_photo"))
                    }
                }

                input
                    id="photo"
                    type="file"
                    name="photo"
                    accept="image/*"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            div class="form-actions"
            {
                a href=(cancel_url) class=(BUTTON_SECONDARY_STYLE) { (t("cancel")) }
                button type="submit" class=(BUTTON_PRIMARY_STYLE)
                {
                    (loading_spinner())
                    (t("save"))
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, RgbImage};

    use crate::{
        Error,
        image_ingest::ImageIngestor,
        item::ImageChange,
        test_utils::MultipartBuilder,
    };

    use super::ItemForm;

    /// A PNG of `width` by `height` pixels.
    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, ImageFormat::Png)
            .expect("Could not encode PNG");

        bytes.into_inner()
    }

    #[tokio::test]
    async fn reads_all_fields() {
        let multipart = MultipartBuilder::new()
            .text("title", "Ruby Red")
            .text("notes", "Everyday")
            .text("tipo", "matte")
            .text("marca", "BrandX")
            .text("cor", "red")
            .text("remove_photo", "true")
            .text("unexpected", "ignored")
            .build()
            .await;

        let form = ItemForm::read(multipart).await.unwrap();

        assert_eq!(
            form,
            ItemForm {
                title: "Ruby Red".to_owned(),
                notes: "Everyday".to_owned(),
                kind: "matte".to_owned(),
                brand: "BrandX".to_owned(),
                colour: "red".to_owned(),
                photo: None,
                remove_photo: true,
            }
        );
    }

    #[tokio::test]
    async fn empty_file_field_is_no_photo() {
        let multipart = MultipartBuilder::new()
            .text("title", "Ruby Red")
            .file("photo", "application/octet-stream", b"")
            .build()
            .await;

        let form = ItemForm::read(multipart).await.unwrap();

        assert_eq!(form.photo, None);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let form = ItemForm {
            title: "  ".to_owned(),
            ..Default::default()
        };

        let result = form.into_draft(ImageIngestor::default()).await;

        assert_eq!(result, Err(Error::EmptyItemTitle));
    }

    #[tokio::test]
    async fn new_photo_is_downsized() {
        let form = ItemForm {
            title: "Ruby Red".to_owned(),
            photo: Some(png(1200, 800)),
            remove_photo: true,
            ..Default::default()
        };

        let draft = form.into_draft(ImageIngestor::default()).await.unwrap();

        let data_url = match draft.image {
            ImageChange::Replace(data_url) => data_url,
            other => panic!("want a replaced image, got {other:?}"),
        };
        let image = ImageIngestor::default().ingest_data_url(&data_url).unwrap();
        assert_eq!((image.width(), image.height()), (600, 400));
    }

    #[tokio::test]
    async fn remove_photo_without_new_photo_removes() {
        let form = ItemForm {
            title: "Ruby Red".to_owned(),
            remove_photo: true,
            ..Default::default()
        };

        let draft = form.into_draft(ImageIngestor::default()).await.unwrap();

        assert_eq!(draft.image, ImageChange::Remove);
    }

    #[tokio::test]
    async fn invalid_photo_is_rejected() {
        let form = ItemForm {
            title: "Ruby Red".to_owned(),
            photo: Some(b"not an image".to_vec()),
            ..Default::default()
        };

        let result = form.into_draft(ImageIngestor::default()).await;

        assert!(matches!(result, Err(Error::ImageProcessing(_))));
    }
}
