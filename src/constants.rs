/// 每个像素参与隐写的颜色通道数 (R, G, B)，alpha 通道从不使用。
pub const CHANNELS_PER_PIXEL: usize = 3;

/// 一个字节的位数。每个通道槽位只存储 1 bit，因此一个字节占用 8 个槽位。
pub const BITS_PER_BYTE: usize = 8;

/// 长度前缀的字节数。
/// 文本长度以 `u32` 小端序存储在隐写区域的最前面。
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// 长度前缀占用的槽位数 (4 * 8 = 32)，也是文本数据的起始位地址。
pub const LENGTH_PREFIX_BITS: usize = LENGTH_PREFIX_BYTES * BITS_PER_BYTE;

/// 未指定输出路径时，隐写结果图像文件名的前缀。
pub const HIDDEN_IMAGE_PREFIX: &str = "doctored_";

/// 未指定输出路径时，恢复文本文件名的前缀。
pub const RECOVERED_TEXT_PREFIX: &str = "recovered_";
