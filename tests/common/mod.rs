#![allow(dead_code)]

use std::fs;
use std::path::Path;

const BMP_HEADER_LEN: u32 = 14 + 40;

/// An uncompressed 24-bit BMP of the given size, filled with mid gray.
///
/// Rows are padded to four bytes as the format requires.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let stride = (width * 3).div_ceil(4) * 4;
    let pixels_len = stride * height;
    let total_len = BMP_HEADER_LEN + pixels_len;

    let mut out = Vec::with_capacity(total_len as usize);
    // file header
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&total_len.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&BMP_HEADER_LEN.to_le_bytes());
    // BITMAPINFOHEADER
    let info: [&[u8]; 11] = [
        &40u32.to_le_bytes(),
        &(width as i32).to_le_bytes(),
        &(height as i32).to_le_bytes(),
        &1u16.to_le_bytes(),
        &24u16.to_le_bytes(),
        &0u32.to_le_bytes(),
        &pixels_len.to_le_bytes(),
        &2835i32.to_le_bytes(),
        &2835i32.to_le_bytes(),
        &0u32.to_le_bytes(),
        &0u32.to_le_bytes(),
    ];
    for field in info {
        out.extend_from_slice(field);
    }
    out.resize(total_len as usize, 0x80);
    out
}

/// Write a BMP fixture, creating parent directories as needed.
pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).expect("create fixture dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp fixture");
}
