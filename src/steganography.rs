//! # 隐写核心算法模块
//!
//! 每个通道槽位的最低有效位存储 1 bit。所有槽位按 `PixelGrid::locate`
//! 的线性化顺序组成一条位流，布局如下：
//!
//! ```text
//! bit 0 .. 32          文本字节长度 (u32，小端序)
//! bit 32 .. 32 + L*8   文本的 UTF-8 字节
//! ```
//!
//! 字节内按最低位优先写入，字节间按下标升序排列。
//!
//! 本模块只操作内存中的 `PixelGrid`，不做任何文件 I/O。
//! 隐写结果只能保存为无损格式，任何有损重压缩都会破坏隐藏的数据。

use crate::constants::{
    BITS_PER_BYTE, CHANNELS_PER_PIXEL, LENGTH_PREFIX_BITS, LENGTH_PREFIX_BYTES,
};
use crate::error::StegoError;
use crate::grid::PixelGrid;
use log::debug;

/// 判断 `payload_len` 字节的文本是否能放入 `width × height` 的图像。
///
/// 只比较文本本身的位数 `payload_len * 8` 与槽位总数 `width * height * 3`，
/// **不**计入 32 bit 的长度前缀。前缀是否放得下由 `encode_text` 在写入前
/// 另行校验，见 `check_layout`。
pub fn payload_fits(width: u32, height: u32, payload_len: usize) -> bool {
    let slots = slot_count(width, height);
    payload_len
        .checked_mul(BITS_PER_BYTE)
        .is_some_and(|bits| bits <= slots)
}

/// 与 `payload_fits` 相同的判断，不满足时返回 `StegoError::Capacity`。
pub fn check_capacity(width: u32, height: u32, payload_len: usize) -> Result<(), StegoError> {
    if payload_fits(width, height, payload_len) {
        return Ok(());
    }

    Err(StegoError::Capacity {
        required_bits: payload_len.saturating_mul(BITS_PER_BYTE),
        available_slots: slot_count(width, height),
    })
}

/// 在计入长度前缀的情况下，图像最多能隐藏的文本字节数。
pub fn max_payload_len(width: u32, height: u32) -> usize {
    (slot_count(width, height) / BITS_PER_BYTE).saturating_sub(LENGTH_PREFIX_BYTES)
}

/// 从位地址 `start_bit` 开始，把 `bytes` 逐位写入各槽位的最低有效位。
///
/// 在修改任何通道之前先校验整个位区间，越界时返回 `StegoError::OutOfBounds`，
/// 网格保持不变。
pub fn pack_bytes(grid: &mut PixelGrid, bytes: &[u8], start_bit: usize) -> Result<(), StegoError> {
    check_range(grid, start_bit, bytes.len())?;

    for (i, &byte) in bytes.iter().enumerate() {
        for j in 0..BITS_PER_BYTE {
            let address = start_bit + i * BITS_PER_BYTE + j;
            let Some(slot) = grid.locate(address) else {
                return Err(out_of_bounds(grid, address + 1));
            };

            let value = grid.channel_mut(slot);
            *value = (*value & 0xFE) | ((byte >> j) & 1);
        }
    }

    Ok(())
}

/// 从位地址 `start_bit` 开始读取 `len` 个字节，是 `pack_bytes` 的逆操作。
///
/// 读取前先校验位区间，因此损坏的长度不会触发越界访问或巨大的内存分配。
pub fn unpack_bytes(grid: &PixelGrid, len: usize, start_bit: usize) -> Result<Vec<u8>, StegoError> {
    check_range(grid, start_bit, len)?;

    (0..len)
        .map(|i| {
            (0..BITS_PER_BYTE).try_fold(0u8, |byte, j| {
                let address = start_bit + i * BITS_PER_BYTE + j;
                grid.locate(address)
                    .map(|slot| byte | ((grid.channel(slot) & 1) << j))
                    .ok_or_else(|| out_of_bounds(grid, address + 1))
            })
        })
        .collect()
}

/// 将 `text` 隐藏到网格中：先写入 4 字节小端序长度前缀，再写入 UTF-8 字节。
///
/// # Errors
///
/// * `StegoError::Capacity` - 文本位数超过槽位总数 (`check_capacity`，不计前缀)，
///   或文本本身放得下但加上 32 bit 前缀后超出槽位总数。
///
/// 错误都在修改任何像素之前返回。
pub fn encode_text(grid: &mut PixelGrid, text: &str) -> Result<(), StegoError> {
    encode_bytes(grid, text.as_bytes())
}

/// `encode_text` 的字节版本。
pub fn encode_bytes(grid: &mut PixelGrid, payload: &[u8]) -> Result<(), StegoError> {
    check_capacity(grid.width(), grid.height(), payload.len())?;

    let len = u32::try_from(payload.len()).map_err(|_| StegoError::Capacity {
        required_bits: payload.len().saturating_mul(BITS_PER_BYTE),
        available_slots: grid.slot_count(),
    })?;

    check_layout(grid, payload.len())?;

    debug!(
        "hiding {} payload bytes in {}x{} grid ({} slots)",
        payload.len(),
        grid.width(),
        grid.height(),
        grid.slot_count()
    );

    pack_bytes(grid, &len.to_le_bytes(), 0)?;
    pack_bytes(grid, payload, LENGTH_PREFIX_BITS)
}

/// 读取长度前缀以及随后的原始文本字节，不做 UTF-8 校验。
///
/// 需要宽松解码的调用方可以对结果使用 `String::from_utf8_lossy`。
///
/// # Errors
///
/// 如果长度前缀指向的区域超出槽位总数 (图像未隐藏数据或已损坏)，
/// 返回 `StegoError::OutOfBounds`。
pub fn decode_bytes(grid: &PixelGrid) -> Result<Vec<u8>, StegoError> {
    let prefix = unpack_bytes(grid, LENGTH_PREFIX_BYTES, 0)?;
    let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);

    debug!(
        "length prefix reads {} bytes in {}x{} grid ({} slots)",
        len,
        grid.width(),
        grid.height(),
        grid.slot_count()
    );

    let len = usize::try_from(len).unwrap_or(usize::MAX);
    unpack_bytes(grid, len, LENGTH_PREFIX_BITS)
}

/// 从网格中恢复隐藏的文本。
///
/// UTF-8 解码是严格的：非法字节序列返回 `StegoError::Encoding`。
pub fn decode_text(grid: &PixelGrid) -> Result<String, StegoError> {
    Ok(String::from_utf8(decode_bytes(grid)?)?)
}

/// 校验长度前缀加文本的完整布局是否放得下，放不下时按容量不足处理。
fn check_layout(grid: &PixelGrid, payload_len: usize) -> Result<(), StegoError> {
    check_range(grid, LENGTH_PREFIX_BITS, payload_len).map_err(|_| StegoError::Capacity {
        required_bits: payload_len
            .saturating_mul(BITS_PER_BYTE)
            .saturating_add(LENGTH_PREFIX_BITS),
        available_slots: grid.slot_count(),
    })
}

fn check_range(grid: &PixelGrid, start_bit: usize, len: usize) -> Result<(), StegoError> {
    let end = len
        .checked_mul(BITS_PER_BYTE)
        .and_then(|bits| bits.checked_add(start_bit));

    match end {
        Some(end) if end <= grid.slot_count() => Ok(()),
        Some(end) => Err(out_of_bounds(grid, end)),
        None => Err(out_of_bounds(grid, usize::MAX)),
    }
}

fn out_of_bounds(grid: &PixelGrid, end_bit: usize) -> StegoError {
    StegoError::OutOfBounds {
        end_bit,
        slot_count: grid.slot_count(),
    }
}

fn slot_count(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(CHANNELS_PER_PIXEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, RngCore};

    /// 创建一个填充随机通道值的网格
    fn random_grid(width: u32, height: u32) -> PixelGrid {
        let mut raw = vec![0u8; width as usize * height as usize * 3];
        rand::rng().fill_bytes(&mut raw);
        let pixels = raw.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        PixelGrid::from_pixels(width, height, pixels).unwrap()
    }

    fn flat_channels(grid: &PixelGrid) -> Vec<u8> {
        (0..grid.height())
            .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
            .flat_map(|(x, y)| grid.get(x, y).unwrap())
            .collect()
    }

    #[test]
    fn hides_and_recovers_short_text() {
        let mut grid = random_grid(10, 10);
        encode_text(&mut grid, "Hi!!!").unwrap();
        assert_eq!(decode_text(&grid).unwrap(), "Hi!!!");
    }

    #[test]
    fn hides_and_recovers_multibyte_text() {
        let text = "隐写测试 with emoji 🦀 and ascii";
        let mut grid = random_grid(31, 17);
        encode_text(&mut grid, text).unwrap();
        assert_eq!(decode_text(&grid).unwrap(), text);
    }

    #[test]
    fn random_texts_round_trip_up_to_capacity() {
        let mut rng = rand::rng();

        for _ in 0..50 {
            let width = rng.random_range(4..40);
            let height = rng.random_range(4..40);
            let mut grid = random_grid(width, height);
            let max = max_payload_len(width, height);

            // 随机字符可能占 1 到 4 个字节；一半情况下尽量填满容量
            let fill = rng.random_bool(0.5);
            let mut text = String::new();
            loop {
                let c: char = rng.random();
                if text.len() + c.len_utf8() > max {
                    break;
                }
                text.push(c);
                if !fill && rng.random_ratio(1, 20) {
                    break;
                }
            }

            encode_text(&mut grid, &text).unwrap();
            assert_eq!(decode_text(&grid).unwrap(), text);
        }
    }

    #[test]
    fn empty_text_needs_only_the_prefix() {
        // 11 个像素 = 33 个槽位，足够存放 32 bit 前缀
        let mut grid = random_grid(11, 1);
        encode_text(&mut grid, "").unwrap();
        assert_eq!(decode_text(&grid).unwrap(), "");
    }

    #[test]
    fn capacity_check_ignores_the_length_prefix() {
        // 10x10 有 300 个槽位
        assert!(payload_fits(10, 10, 37));
        assert!(!payload_fits(10, 10, 38));
        assert!(check_capacity(10, 10, 37).is_ok());

        // 2x2 有 12 个槽位：1 字节 (8 bit) 通过检查，2 字节 (16 bit) 不通过
        assert!(payload_fits(2, 2, 0));
        assert!(payload_fits(2, 2, 1));
        assert!(!payload_fits(2, 2, 2));
    }

    #[test]
    fn capacity_boundary_exactly_full() {
        // 8x1 有 24 个槽位 = 3 字节
        assert!(payload_fits(8, 1, 3));
        assert!(!payload_fits(8, 1, 4));

        let err = check_capacity(8, 1, 4).unwrap_err();
        assert!(matches!(
            err,
            StegoError::Capacity {
                required_bits: 32,
                available_slots: 24
            }
        ));
    }

    #[test]
    fn payload_filling_every_slot_fails_on_the_prefix_without_mutation() {
        // 3 字节正好占满 24 个槽位，通过容量检查，但前缀放不下
        assert!(check_capacity(8, 1, 3).is_ok());

        let mut grid = random_grid(8, 1);
        let before = grid.clone();

        let err = encode_text(&mut grid, "abc").unwrap_err();
        assert!(matches!(
            err,
            StegoError::Capacity {
                required_bits: 56,
                available_slots: 24
            }
        ));
        assert_eq!(grid, before);
    }

    #[test]
    fn text_that_fits_only_without_prefix_is_a_capacity_error() {
        // 37 * 8 = 296 <= 300，但加上前缀是 328
        let mut grid = PixelGrid::new(10, 10, [7; 3]);
        let err = encode_text(&mut grid, &"x".repeat(37)).unwrap_err();
        assert!(matches!(
            err,
            StegoError::Capacity {
                required_bits: 328,
                available_slots: 300
            }
        ));
        assert_eq!(grid, PixelGrid::new(10, 10, [7; 3]));
    }

    #[test]
    fn payload_one_bit_over_capacity_is_rejected_without_mutation() {
        let mut grid = random_grid(8, 1);
        let before = grid.clone();

        let err = encode_text(&mut grid, "abcd").unwrap_err();
        assert!(matches!(err, StegoError::Capacity { .. }));
        assert_eq!(grid, before);
    }

    #[test]
    fn tiny_grid_rejects_two_byte_text() {
        let mut grid = random_grid(2, 2);
        let before = grid.clone();

        let err = encode_text(&mut grid, "ab").unwrap_err();
        assert!(matches!(
            err,
            StegoError::Capacity {
                required_bits: 16,
                available_slots: 12
            }
        ));
        assert_eq!(grid, before);

        // 1 字节和空文本都能通过容量检查，但 12 个槽位放不下前缀
        let err = encode_text(&mut grid, "a").unwrap_err();
        assert!(matches!(
            err,
            StegoError::Capacity {
                required_bits: 40,
                available_slots: 12
            }
        ));
        assert_eq!(grid, before);

        let err = encode_text(&mut grid, "").unwrap_err();
        assert!(matches!(
            err,
            StegoError::Capacity {
                required_bits: 32,
                available_slots: 12
            }
        ));
        assert_eq!(grid, before);
    }

    #[test]
    fn encode_changes_only_least_significant_bits() {
        let mut grid = random_grid(16, 9);
        let before = flat_channels(&grid);
        let text = "lsb only";

        encode_text(&mut grid, text).unwrap();
        let after = flat_channels(&grid);

        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a & 0xFE, b & 0xFE);
        }

        // 超出 32 + L*8 的槽位完全不变
        let used = LENGTH_PREFIX_BITS + text.len() * BITS_PER_BYTE;
        for address in used..grid.slot_count() {
            let slot = grid.locate(address).unwrap();
            let i = (slot.y as usize * 16 + slot.x as usize) * 3 + slot.channel;
            assert_eq!(before[i], after[i], "untouched slot {} changed", address);
        }
    }

    #[test]
    fn length_prefix_is_little_endian_lsb_first() {
        let mut grid = PixelGrid::new(4, 4, [0xFF; 3]);
        encode_text(&mut grid, "A").unwrap();

        // 长度 1 → 前缀的第 0 位为 1，其余 31 位为 0
        let prefix_bits: Vec<u8> = (0..LENGTH_PREFIX_BITS)
            .map(|a| grid.channel(grid.locate(a).unwrap()) & 1)
            .collect();
        assert_eq!(prefix_bits[0], 1);
        assert!(prefix_bits[1..].iter().all(|&b| b == 0));

        // 'A' = 0x41 = 0b0100_0001，最低位优先
        let payload_bits: Vec<u8> = (32..40)
            .map(|a| grid.channel(grid.locate(a).unwrap()) & 1)
            .collect();
        assert_eq!(payload_bits, vec![1, 0, 0, 0, 0, 0, 1, 0]);
    }

    #[test]
    fn length_prefix_fidelity() {
        for len in [0usize, 1, 255, 65536] {
            // 每列 1 个像素，宽度足够容纳 32 + len*8 个槽位
            let width = ((LENGTH_PREFIX_BITS + len * BITS_PER_BYTE) / 3 + 1) as u32;
            let mut grid = PixelGrid::new(width, 1, [0x80; 3]);
            let payload = vec![b'z'; len];

            encode_bytes(&mut grid, &payload).unwrap();

            let prefix = unpack_bytes(&grid, LENGTH_PREFIX_BYTES, 0).unwrap();
            assert_eq!(
                u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize,
                len
            );
            assert_eq!(decode_bytes(&grid).unwrap(), payload);
        }
    }

    #[test]
    fn corrupted_length_prefix_is_out_of_bounds() {
        let mut grid = random_grid(10, 10);
        pack_bytes(&mut grid, &u32::MAX.to_le_bytes(), 0).unwrap();

        let err = decode_text(&grid).unwrap_err();
        assert!(matches!(err, StegoError::OutOfBounds { slot_count: 300, .. }));
    }

    #[test]
    fn decode_on_grid_too_small_for_prefix() {
        let grid = random_grid(2, 2);
        assert!(matches!(
            decode_bytes(&grid).unwrap_err(),
            StegoError::OutOfBounds { end_bit: 32, slot_count: 12 }
        ));
    }

    #[test]
    fn invalid_utf8_payload_is_an_encoding_error() {
        let mut grid = random_grid(10, 10);
        encode_bytes(&mut grid, &[0xFF, 0xFE, 0x41]).unwrap();

        assert!(matches!(
            decode_text(&grid).unwrap_err(),
            StegoError::Encoding(_)
        ));
        assert_eq!(
            String::from_utf8_lossy(&decode_bytes(&grid).unwrap()),
            "\u{FFFD}\u{FFFD}A"
        );
    }

    #[test]
    fn pack_and_unpack_at_offset() {
        let mut grid = random_grid(5, 5);
        pack_bytes(&mut grid, &[0xA5, 0x3C], 7).unwrap();
        assert_eq!(unpack_bytes(&grid, 2, 7).unwrap(), vec![0xA5, 0x3C]);
    }

    #[test]
    fn pack_out_of_range_leaves_grid_untouched() {
        let mut grid = random_grid(2, 2);
        let before = grid.clone();

        let err = pack_bytes(&mut grid, &[0xFF], 5).unwrap_err();
        assert!(matches!(
            err,
            StegoError::OutOfBounds {
                end_bit: 13,
                slot_count: 12
            }
        ));
        assert_eq!(grid, before);
    }

    #[test]
    fn max_payload_len_accounts_for_prefix() {
        assert_eq!(max_payload_len(10, 10), 33);
        assert_eq!(max_payload_len(2, 2), 0);
        assert_eq!(max_payload_len(0, 0), 0);

        let mut grid = random_grid(10, 10);
        let text = "x".repeat(max_payload_len(10, 10));
        encode_text(&mut grid, &text).unwrap();
        assert_eq!(decode_text(&grid).unwrap(), text);
    }
}
