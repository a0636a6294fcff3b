//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::constants::{HIDDEN_IMAGE_PREFIX, RECOVERED_TEXT_PREFIX};
use crate::error::StegoError;
use crate::grid::PixelGrid;
use crate::image_io::{ensure_lossless_output, load_rgba, save_rgba};
use crate::steganography::{decode_text, encode_text, max_payload_len};
use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本、检查输出路径、调用隐写核心函数隐藏长度和文本，
/// 最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或文本文件，或文本文件不是 UTF-8 编码。
/// * 目标文件已存在且未指定 `--force`，或目标格式不是无损格式。
/// * 图像文件没有足够的空间来隐藏文本。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let text = match (&args.text, args.message) {
        (Some(path), _) => fs::read_to_string(path).with_context(|| {
            format!(
                "Unable to read text file (it must exist and be valid UTF-8): {}",
                path.to_string_lossy().red().bold()
            )
        })?,
        (None, Some(message)) => message,
        (None, None) => anyhow::bail!("Either a text file or an inline message is required."),
    };

    let dest = args
        .dest
        .unwrap_or_else(|| default_hidden_path(&args.image));
    ensure_writable(&dest, args.force)?;
    ensure_lossless_output(&dest)?;

    let mut picture = load_rgba(&args.image)?;
    let mut grid = PixelGrid::from_rgba(&picture);

    encode_text(&mut grid, &text).map_err(|err| describe_hide_error(err, text.len()))?;

    grid.write_rgba(&mut picture)
        .context("Failed to write the modified pixels back into the image.")?;
    save_rgba(&picture, &dest)?;

    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、恢复文本长度和内容，
/// 最后将恢复的文本写入目标文本文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 长度前缀损坏或恢复的内容不是合法的 UTF-8。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let output = args
        .text
        .unwrap_or_else(|| default_recovered_path(&args.image));
    ensure_writable(&output, args.force)?;

    let picture = load_rgba(&args.image)?;
    let grid = PixelGrid::from_rgba(&picture);

    let text = decode_text(&grid).with_context(|| {
        format!(
            "Failed to recover hidden text from '{}'. \nThe image may not contain a hidden message or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    fs::write(&output, &text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            output.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑，打印图像尺寸、槽位数和最大可隐藏字节数。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let picture = load_rgba(&args.image)?;
    let grid = PixelGrid::from_rgba(&picture);

    println!(
        "Image: {} ({}x{})",
        args.image.to_string_lossy().bold(),
        grid.width(),
        grid.height()
    );
    println!(
        "Channel slots: {}",
        grid.slot_count().to_string().green().bold()
    );
    println!(
        "Maximum hidden text: {} bytes",
        max_payload_len(grid.width(), grid.height())
            .to_string()
            .green()
            .bold()
    );

    Ok(())
}

/// 默认的隐写结果路径：与输入图像同目录的 `doctored_<stem>.png`。
pub fn default_hidden_path(image: &Path) -> PathBuf {
    prefixed_sibling(image, HIDDEN_IMAGE_PREFIX, "png")
}

/// 默认的恢复文本路径：与输入图像同目录的 `recovered_<stem>.txt`。
pub fn default_recovered_path(image: &Path) -> PathBuf {
    prefixed_sibling(image, RECOVERED_TEXT_PREFIX, "txt")
}

fn prefixed_sibling(path: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    path.with_file_name(format!("{prefix}{stem}.{extension}"))
}

/// 未指定 `force` 时拒绝覆盖已存在的文件。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {} \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );

    if force && path.exists() {
        debug!("overwriting {}", path.display());
    }

    Ok(())
}

/// 将核心错误转换为面向用户的说明。
fn describe_hide_error(err: StegoError, text_len: usize) -> anyhow::Error {
    match err {
        StegoError::Capacity {
            required_bits,
            available_slots,
        } => anyhow::anyhow!(
            "Not enough space in the image to hide the text. \nRequired: {}, Available: {}",
            required_bits.to_string().red().bold(),
            available_slots.to_string().green().bold()
        ),
        other => anyhow::Error::new(other).context(format!(
            "Failed to hide {} bytes of text.",
            text_len.to_string().red().bold()
        )),
    }
}
