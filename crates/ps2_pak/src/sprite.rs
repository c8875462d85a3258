//! Relocation of SPZ frame tables.
//!
//! Sprites inside GLOBAL.PAK are used straight from memory. Their frame tables hold global frame ids
//! and RAM addresses derived from where the archive ends up in RAM, instead of the zero ids and
//! sprite relative offsets every other sprite uses. Whenever entry offsets change those tables have
//! to be rebuilt, and when extracting they are turned back into plain sprites.

use std::io::Cursor;

use binrw::{BinRead, BinWrite};

use crate::error::{Error, Result};
use crate::types::{FrameRecord, SpriteHeader, FRAME_RECORD_SIZE, SPRITE_HEADER_SIZE};

/// Location of the last byte of GLOBAL.PAK inside the PS2's RAM
pub const GLOBAL_PAK_RAM_OFFSET: u32 = 0x1F7DFD0;

/// Id of the first frame of the first sprite in GLOBAL.PAK
pub const SPZ_BASE_FRAME_ID: u32 = 5;

/// A parsed sprite header together with its frame table
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub header: SpriteHeader,
    pub frames: Vec<FrameRecord>,
}

impl Sprite {
    /// Parse the sprite at the start of `data`.
    ///
    /// Returns `None` for data that is not a sprite, and an error for a sprite whose frame table
    /// does not fit into `data`.
    pub fn parse(data: &[u8]) -> Result<Option<Sprite>> {
        let mut cursor = Cursor::new(data);
        let Ok(header) = SpriteHeader::read(&mut cursor) else {
            return Ok(None);
        };

        if (data.len() as u64) < Self::data_start_for(&header) as u64 {
            return Err(Error::MalformedSprite(format!(
                "{} frames do not fit into {} bytes",
                header.frame_count,
                data.len()
            )));
        }

        let frames = (0..header.frame_count)
            .map(|_| FrameRecord::read(&mut cursor))
            .collect::<binrw::BinResult<Vec<_>>>()?;

        Ok(Some(Sprite { header, frames }))
    }

    /// Offset of the first byte after the frame table
    pub fn data_start(&self) -> u32 {
        Self::data_start_for(&self.header)
    }

    fn data_start_for(header: &SpriteHeader) -> u32 {
        SPRITE_HEADER_SIZE + header.frame_count as u32 * FRAME_RECORD_SIZE
    }

    /// Write header and frame table back over the start of `data`.
    pub fn store(&self, data: &mut [u8]) -> Result<()> {
        let mut cursor = Cursor::new(data);
        self.header.write(&mut cursor)?;
        for frame in &self.frames {
            frame.write(&mut cursor)?;
        }
        Ok(())
    }
}

/// Rewrites the frame tables of the sprites in GLOBAL.PAK
///
/// Frame ids are handed out in the order sprites are passed in, which has to be archive order.
#[derive(Debug, Clone)]
pub struct FrameRelocator {
    next_frame_id: u32,
}

impl Default for FrameRelocator {
    fn default() -> Self {
        Self {
            next_frame_id: SPZ_BASE_FRAME_ID,
        }
    }
}

impl FrameRelocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next relocated frame receives
    pub fn next_frame_id(&self) -> u32 {
        self.next_frame_id
    }

    /// Relocate the sprite in `data`, which is stored at `entry_offset` in the archive.
    ///
    /// Returns false, leaving `data` untouched, if it is not a sprite.
    pub fn relocate(&mut self, data: &mut [u8], entry_offset: u32) -> Result<bool> {
        let Some(mut sprite) = Sprite::parse(data)? else {
            return Ok(false);
        };

        if sprite.header.ram_flag != 0 {
            return Err(Error::MalformedSprite(
                "frame table already holds RAM addresses".into(),
            ));
        }

        let data_start = sprite.data_start();
        let mut frame_id = self.next_frame_id;
        for frame in &mut sprite.frames {
            let relative = frame
                .frame_offset
                .checked_sub(data_start)
                .filter(|relative| (*relative as u64) <= (data.len() - data_start as usize) as u64)
                .ok_or_else(|| {
                    Error::MalformedSprite(format!(
                        "frame offset {:#X} is outside of the sprite",
                        frame.frame_offset
                    ))
                })?;

            frame.frame_offset = GLOBAL_PAK_RAM_OFFSET
                .checked_sub(entry_offset)
                .and_then(|address| address.checked_sub(relative))
                .ok_or_else(|| {
                    Error::MalformedSprite(format!(
                        "frame at {:#X} lies beyond the RAM base",
                        entry_offset as u64 + relative as u64
                    ))
                })?;
            frame.frame_id = frame_id;
            frame_id += 1;
        }

        sprite.header.ram_flag = 1;
        sprite.store(data)?;
        self.next_frame_id = frame_id;

        Ok(true)
    }
}

/// Turn a relocated sprite, stored at `entry_offset` in the archive, back into a plain one.
///
/// Returns false, leaving `data` untouched, if it is not a relocated sprite.
pub fn restore_frames(data: &mut [u8], entry_offset: u32) -> Result<bool> {
    let Some(mut sprite) = Sprite::parse(data)? else {
        return Ok(false);
    };

    if sprite.header.ram_flag == 0 {
        return Ok(false);
    }

    let data_start = sprite.data_start();
    for frame in &mut sprite.frames {
        frame.frame_offset = GLOBAL_PAK_RAM_OFFSET
            .checked_sub(entry_offset)
            .and_then(|address| address.checked_sub(frame.frame_offset))
            .and_then(|relative| relative.checked_add(data_start))
            .filter(|offset| (*offset as usize) <= data.len())
            .ok_or_else(|| {
                Error::MalformedSprite(format!(
                    "RAM address {:#X} does not point into the sprite",
                    frame.frame_offset
                ))
            })?;
        frame.frame_id = 0;
    }

    sprite.header.ram_flag = 0;
    sprite.store(data)?;

    Ok(true)
}
