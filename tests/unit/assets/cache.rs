use std::io::Cursor;

use super::*;
use crate::testing::{temp_dir, write_png};

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(
        decoded.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_is_error() {
    assert!(decode_image(b"not a png").is_err());
}

#[test]
fn same_path_decodes_once() {
    let tmp = temp_dir("cache_decode_once");
    let path = tmp.join("01.png");
    write_png(&path, 2, 3, [10, 20, 30, 255]);

    let cache = ImageCache::new();
    assert!(cache.is_empty().unwrap());
    let a = cache.get_or_load(&path).unwrap();
    let b = cache.get_or_load(&path).unwrap();
    assert_eq!((a.width, a.height), (2, 3));
    assert!(Arc::ptr_eq(&a.rgba8_premul, &b.rgba8_premul));
    assert_eq!(cache.decode_count(&path).unwrap(), 1);
    assert_eq!(cache.len().unwrap(), 1);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_file_is_error_and_not_cached() {
    let tmp = temp_dir("cache_missing");
    let cache = ImageCache::new();
    assert!(cache.get_or_load(&tmp.join("nope.png")).is_err());
    assert!(cache.is_empty().unwrap());
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn poisoned_lock_is_reported() {
    let tmp = temp_dir("cache_poisoned");
    let path = tmp.join("01.png");
    write_png(&path, 1, 1, [0, 0, 0, 255]);

    let cache = Arc::new(ImageCache::new());
    let holder = Arc::clone(&cache);
    let joined = std::thread::spawn(move || {
        let _guard = holder.inner.lock().unwrap();
        panic!("poison the cache lock");
    })
    .join();
    assert!(joined.is_err());

    assert!(cache.len().is_err());
    assert!(cache.is_empty().is_err());
    assert!(cache.decode_count(&path).is_err());
    assert!(cache.get_or_load(&path).is_err());

    std::fs::remove_dir_all(&tmp).ok();
}
