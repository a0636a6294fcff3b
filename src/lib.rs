//! # lsb_text_hide 库
//!
//! 本库包含 LSB 文本隐写工具的核心逻辑。
//!
//! 核心 (`grid`、`steganography`) 只操作内存中的像素网格；
//! 文件读写、命令行与结果报告由 `image_io`、`cli` 和 `handler` 完成。

// 声明库包含的所有模块。

pub mod cli;
pub mod constants;
pub mod error;
pub mod grid;
pub mod handler;
pub mod image_io;
pub mod steganography;

pub use error::StegoError;
pub use grid::PixelGrid;
pub use steganography::{decode_text, encode_text, payload_fits};
