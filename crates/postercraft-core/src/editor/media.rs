//! Image insertion and cropping.

use super::Editor;
use crate::images::{ImageError, ImageLoader, LoadedImage};
use crate::shapes::{Image, Shape, ShapeId, ShapeKind, ShapeStyle, ShapeType, generate_id};
use kurbo::Size;
use std::sync::Arc;

impl Editor {
    /// Load an image and place it centered in the safe area, scaled down to
    /// fit. Nothing is written if loading fails.
    pub async fn add_image(
        &mut self,
        loader: &dyn ImageLoader,
        src: &str,
    ) -> Result<ShapeId, ImageError> {
        let loaded = match loader.load(src).await {
            Ok(loaded) => loaded,
            Err(e) => {
                log::error!("Failed to load image {}: {}", src, e);
                return Err(e);
            }
        };
        Ok(self.insert_loaded_image(loaded))
    }

    /// Place an already loaded image. Reads the safe area at call time.
    pub fn insert_loaded_image(&mut self, loaded: LoadedImage) -> ShapeId {
        let mut image = Image::new(loaded.src, f64::from(loaded.width), f64::from(loaded.height));
        image.is_svg_image = loaded.is_svg;
        let area = self.state().safe_area.rect();
        image.fit_within(area.size());
        let size = Size::new(image.width, image.height);
        let origin = area.center() - size.to_vec2() / 2.0;

        let shape = Shape::with_kind(
            generate_id(ShapeType::Image),
            ShapeKind::Image(image),
            ShapeStyle::default(),
        )
        .at(origin.x, origin.y);
        self.insert_shape(shape)
    }

    /// Replace an image's displayed source with a cropped version. The
    /// original source is kept for re-cropping.
    pub fn crop_image(&mut self, id: &str, cropped_src: &str, size: Size) -> bool {
        let Some(index) = self.state().shape_index(id) else {
            return false;
        };
        let shape = &self.shapes()[index];
        if shape.is_locked || shape.as_image().is_none() {
            return false;
        }
        let mut shapes = self.shapes().to_vec();
        if let ShapeKind::Image(image) = &mut Arc::make_mut(&mut shapes[index]).kind {
            image.crop(cropped_src, size.width, size.height);
        }
        self.write_shapes(shapes);
        self.commit();
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::editor::Editor;
    use crate::images::{ImageError, ImageLoader, LoadedImage};
    use crate::storage::BoxFuture;
    use kurbo::Size;
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);
        loop {
            if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
                return result;
            }
        }
    }

    struct FixedLoader(Result<(u32, u32), ImageError>);

    impl ImageLoader for FixedLoader {
        fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<LoadedImage, ImageError>> {
            let result = self.0.clone().map(|(width, height)| LoadedImage {
                src: src.to_string(),
                width,
                height,
                is_svg: false,
            });
            Box::pin(async move { result })
        }
    }

    #[test]
    fn test_add_image_fits_and_centers() {
        let mut editor = Editor::default();
        let loader = FixedLoader(Ok((2160, 1080)));
        let id = block_on(editor.add_image(&loader, "https://img/large.png")).unwrap();

        let shape = editor.state().shape(&id).unwrap();
        let image = shape.as_image().unwrap();
        assert!((image.width - 1080.0).abs() < 1e-9);
        assert!((image.height - 540.0).abs() < 1e-9);
        assert!((shape.position.x - 0.0).abs() < 1e-9);
        assert!((shape.position.y - 270.0).abs() < 1e-9);
        assert_eq!(editor.selected_ids(), &[id]);
    }

    #[test]
    fn test_failed_load_leaves_document_untouched() {
        let mut editor = Editor::default();
        let len = editor.history().len();
        let loader = FixedLoader(Err(ImageError::RateLimited { retry_after_secs: Some(60) }));
        let err = block_on(editor.add_image(&loader, "https://img/x.png")).unwrap_err();
        assert!(err.is_retryable());
        assert!(editor.shapes().is_empty());
        assert_eq!(editor.history().len(), len);
    }

    #[test]
    fn test_crop_keeps_original_source() {
        let mut editor = Editor::default();
        let loader = FixedLoader(Ok((100, 100)));
        let id = block_on(editor.add_image(&loader, "original.png")).unwrap();

        assert!(editor.crop_image(&id, "crop-1.png", Size::new(50.0, 40.0)));
        assert!(editor.crop_image(&id, "crop-2.png", Size::new(20.0, 20.0)));
        let image = editor.state().shape(&id).unwrap().as_image().unwrap().clone();
        assert_eq!(image.src, "crop-2.png");
        assert_eq!(image.crop_source(), "original.png");
        assert!((image.width - 20.0).abs() < f64::EPSILON);
        assert!(!editor.crop_image("missing", "x.png", Size::new(1.0, 1.0)));
    }
}
