// zipdiff-parsers/src/zip/fixture.rs
//! In-memory ZIP writer for tests
//!
//! Produces small, valid archives without ZIP64 records. Not a general
//! purpose writer: sizes must fit in 32 bits.

use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::traits::ParseResult;
use super::{
    CompressionMethod, ZipCompression, CD_SIGNATURE, EOCD_SIGNATURE, LOCAL_HEADER_SIGNATURE,
};

/// Version 2.0: deflate and directories
const VERSION: u16 = 20;

struct PendingMember {
    name: String,
    data: Vec<u8>,
    method: CompressionMethod,
}

/// Builder for test archives
#[derive(Default)]
pub struct ZipFixture {
    members: Vec<PendingMember>,
}

impl ZipFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member stored without compression
    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        self.member(name, data, CompressionMethod::Store)
    }

    /// Add a DEFLATE compressed member
    pub fn deflated(self, name: &str, data: &[u8]) -> Self {
        self.member(name, data, CompressionMethod::Deflate)
    }

    /// Add a directory member; a trailing `/` is appended if missing
    pub fn directory(self, name: &str) -> Self {
        let name = if name.ends_with('/') { name.to_string() } else { format!("{}/", name) };
        self.member(&name, &[], CompressionMethod::Store)
    }

    /// Add a member with an explicit compression method
    pub fn member(mut self, name: &str, data: &[u8], method: CompressionMethod) -> Self {
        self.members.push(PendingMember {
            name: name.to_string(),
            data: data.to_vec(),
            method,
        });
        self
    }

    /// Serialize the archive
    pub fn finish(self) -> ParseResult<Vec<u8>> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for member in &self.members {
            let offset = out.len() as u32;
            let crc = ZipCompression::crc32(&member.data);
            let payload = ZipCompression::compress(&member.data, member.method)?;
            let method = u16::from(member.method);
            let name = member.name.as_bytes();

            out.write_u32::<LittleEndian>(LOCAL_HEADER_SIGNATURE)?;
            out.write_u16::<LittleEndian>(VERSION)?;
            out.write_u16::<LittleEndian>(0)?; // flags
            out.write_u16::<LittleEndian>(method)?;
            out.write_u16::<LittleEndian>(0)?; // mod time
            out.write_u16::<LittleEndian>(0x21)?; // mod date, 1980-01-01
            out.write_u32::<LittleEndian>(crc)?;
            out.write_u32::<LittleEndian>(payload.len() as u32)?;
            out.write_u32::<LittleEndian>(member.data.len() as u32)?;
            out.write_u16::<LittleEndian>(name.len() as u16)?;
            out.write_u16::<LittleEndian>(0)?; // extra length
            out.write_all(name)?;
            out.write_all(&payload)?;

            central.write_u32::<LittleEndian>(CD_SIGNATURE)?;
            central.write_u16::<LittleEndian>(VERSION)?; // made by
            central.write_u16::<LittleEndian>(VERSION)?; // needed
            central.write_u16::<LittleEndian>(0)?;
            central.write_u16::<LittleEndian>(method)?;
            central.write_u16::<LittleEndian>(0)?;
            central.write_u16::<LittleEndian>(0x21)?;
            central.write_u32::<LittleEndian>(crc)?;
            central.write_u32::<LittleEndian>(payload.len() as u32)?;
            central.write_u32::<LittleEndian>(member.data.len() as u32)?;
            central.write_u16::<LittleEndian>(name.len() as u16)?;
            central.write_u16::<LittleEndian>(0)?; // extra length
            central.write_u16::<LittleEndian>(0)?; // comment length
            central.write_u16::<LittleEndian>(0)?; // disk start
            central.write_u16::<LittleEndian>(0)?; // internal attrs
            central.write_u32::<LittleEndian>(0)?; // external attrs
            central.write_u32::<LittleEndian>(offset)?;
            central.write_all(name)?;
        }

        let cd_offset = out.len() as u32;
        let count = self.members.len() as u16;
        out.write_all(&central)?;

        out.write_u32::<LittleEndian>(EOCD_SIGNATURE)?;
        out.write_u16::<LittleEndian>(0)?; // this disk
        out.write_u16::<LittleEndian>(0)?; // cd disk
        out.write_u16::<LittleEndian>(count)?;
        out.write_u16::<LittleEndian>(count)?;
        out.write_u32::<LittleEndian>(central.len() as u32)?;
        out.write_u32::<LittleEndian>(cd_offset)?;
        out.write_u16::<LittleEndian>(0)?; // comment length

        Ok(out)
    }

    /// Serialize the archive to `path`
    pub fn write_to(self, path: &Path) -> ParseResult<()> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
