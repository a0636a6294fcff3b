//! # 像素网格模块
//!
//! `PixelGrid` 是隐写核心操作的内存像素缓冲区：`width × height` 个像素，
//! 每个像素由三个 8 位通道组成。它与具体的图像文件格式无关，
//! 文件的解码与编码由 `image_io` 模块负责。

use crate::constants::CHANNELS_PER_PIXEL;
use crate::error::StegoError;
use image::RgbaImage;

/// 单个像素的三个颜色通道 (R, G, B)。
pub type Channels = [u8; CHANNELS_PER_PIXEL];

/// 一个位地址对应的具体通道槽位。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAddress {
    pub x: u32,
    pub y: u32,
    pub channel: usize,
}

/// 按行优先顺序存储的可变像素缓冲区。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Channels>,
}

impl PixelGrid {
    /// 创建一个所有通道均为 `fill` 的网格。
    pub fn new(width: u32, height: u32, fill: Channels) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// 用行优先的像素数据创建网格。像素数量必须等于 `width * height`。
    /// 乘积溢出时同样返回 `None`。
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Channels>) -> Option<Self> {
        let count = (width as usize).checked_mul(height as usize)?;
        (pixels.len() == count).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// 复制 RGBA 图像的 R, G, B 通道，alpha 通道不进入网格。
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let pixels = image
            .pixels()
            .map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();

        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }

    /// 将网格的 R, G, B 写回 RGBA 图像，保留原有的 alpha 通道。
    ///
    /// # Errors
    ///
    /// 如果图像尺寸与网格不一致，返回 `StegoError::DimensionMismatch`，图像不会被修改。
    pub fn write_rgba(&self, image: &mut RgbaImage) -> Result<(), StegoError> {
        if image.dimensions() != (self.width, self.height) {
            return Err(StegoError::DimensionMismatch {
                grid_width: self.width,
                grid_height: self.height,
                image_width: image.width(),
                image_height: image.height(),
            });
        }

        image
            .pixels_mut()
            .zip(&self.pixels)
            .for_each(|(target, source)| target.0[..CHANNELS_PER_PIXEL].copy_from_slice(source));

        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 可用于隐藏数据的通道槽位总数 (`width * height * 3`)。
    pub fn slot_count(&self) -> usize {
        self.pixels.len() * CHANNELS_PER_PIXEL
    }

    /// 读取 `(x, y)` 处像素的三个通道。坐标越界时返回 `None`。
    pub fn get(&self, x: u32, y: u32) -> Option<Channels> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// 写入 `(x, y)` 处像素的三个通道。坐标越界时返回 `false` 且不做任何修改。
    pub fn set(&mut self, x: u32, y: u32, channels: Channels) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = channels;
                true
            }
            None => false,
        }
    }

    /// 将扁平的位地址映射到通道槽位。
    ///
    /// 线性化沿转置轴进行：先遍历一整列 (所有 `y` 和通道)，再前进到下一个 `x`：
    ///
    /// * `x = address / (height * 3)`
    /// * `y = (address % (height * 3)) / 3`
    /// * `channel = address % 3`
    ///
    /// 地址不小于 `slot_count()` 时返回 `None`。
    pub fn locate(&self, address: usize) -> Option<SlotAddress> {
        if address >= self.slot_count() {
            return None;
        }

        let column = self.height as usize * CHANNELS_PER_PIXEL;
        Some(SlotAddress {
            x: (address / column) as u32,
            y: ((address % column) / CHANNELS_PER_PIXEL) as u32,
            channel: address % CHANNELS_PER_PIXEL,
        })
    }

    /// 读取某个槽位的通道值。
    pub(crate) fn channel(&self, slot: SlotAddress) -> u8 {
        self.pixels[self.flat(slot.x, slot.y)][slot.channel]
    }

    /// 修改某个槽位的通道值。
    pub(crate) fn channel_mut(&mut self, slot: SlotAddress) -> &mut u8 {
        let i = self.flat(slot.x, slot.y);
        &mut self.pixels[i][slot.channel]
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| self.flat(x, y))
    }

    fn flat(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
