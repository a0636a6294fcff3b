//! # 核心错误类型
//!
//! 隐写核心 (`grid` 与 `steganography`) 只返回 `StegoError`，
//! 由上层的 `handler` 转换为带上下文的 `anyhow::Error`。

use std::string::FromUtf8Error;
use thiserror::Error;

/// 隐写核心可能产生的错误。
#[derive(Error, Debug)]
pub enum StegoError {
    /// 文本所需的位数超过了图像可用的通道槽位数。在修改任何像素之前返回。
    #[error("payload needs {required_bits} bits but the image only has {available_slots} channel slots")]
    Capacity {
        required_bits: usize,
        available_slots: usize,
    },

    /// 计算出的位地址超出了图像的槽位范围，通常意味着长度前缀已损坏。
    #[error("bit range ends at {end_bit} but the image only has {slot_count} channel slots")]
    OutOfBounds { end_bit: usize, slot_count: usize },

    /// 恢复出的文本字节不是合法的 UTF-8。
    #[error("hidden payload is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),

    /// 像素网格与目标图像的尺寸不一致。
    #[error("grid is {grid_width}x{grid_height} but the image is {image_width}x{image_height}")]
    DimensionMismatch {
        grid_width: u32,
        grid_height: u32,
        image_width: u32,
        image_height: u32,
    },
}
