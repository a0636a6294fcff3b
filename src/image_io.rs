//! # 图像文件读写模块
//!
//! 负责在图像文件与 `RgbaImage` 之间转换。隐写核心只接触 `PixelGrid`，
//! 本模块是它与文件系统之间唯一的桥梁。

use anyhow::{Context, Result};
use colored::Colorize;
use image::{ImageFormat, RgbaImage};
use log::info;
use std::path::Path;

/// 可以安全保存隐写结果的无损格式。
const LOSSLESS_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
    ImageFormat::WebP,
    ImageFormat::Qoi,
];

/// 读取图像文件并转换为 RGBA8 像素缓冲区。
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    info!(
        "loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );

    Ok(image.to_rgba8())
}

/// 根据扩展名确定输出格式，拒绝无法识别或有损的格式。
///
/// 有损重压缩会破坏最低有效位，因此必须在做任何工作之前检查。
pub fn ensure_lossless_output(path: &Path) -> Result<ImageFormat> {
    let format = ImageFormat::from_path(path).with_context(|| {
        format!(
            "Cannot determine the image format of output path: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    anyhow::ensure!(
        LOSSLESS_FORMATS.contains(&format),
        "Output format {} is lossy or unsupported; the hidden text would be destroyed. \nUse one of: {}",
        format!("{:?}", format).red().bold(),
        "png, bmp, tiff, webp, qoi".green().bold()
    );

    Ok(format)
}

/// 以 `path` 扩展名对应的无损格式保存图像。
pub fn save_rgba(image: &RgbaImage, path: &Path) -> Result<()> {
    let format = ensure_lossless_output(path)?;

    image.save_with_format(path, format).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    info!("saved {} as {:?}", path.display(), format);
    Ok(())
}
