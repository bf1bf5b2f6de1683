// MIT License
//
// Copyright (c) 2025 quex developers
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Fixed-width record file format.
//!
//! A record file stores a header followed by zero or more fixed-width
//! records:
//!
//! ```text
//! offset  bytes   meaning
//! 0       4       magic number, 0x31 0x08 0x19 0x98
//! 4       8       record count (u64, big-endian)
//! 12      1       field count F, at most 255
//! 13      F       field-type codes, one byte per field, each in {0,1,2}
//! 13+F    64*F    field names, each padded with '\n' to 64 bytes
//! ...             records, each of width sum(width(type_i))
//! ```
//!
//! Field values are padded with `\n` to their type's width; on read a
//! value is everything before the first pad byte in its cell. A value
//! containing `\n` therefore cannot be round-tripped; this is a known
//! format limitation.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use thiserror::Error;

/// Marker value indicating a file is a record file.
pub const MAGIC_NUMBER: [u8; 4] = [0x31, 0x08, 0x19, 0x98];

/// Byte used to fill the unused tail of a fixed-width cell.
pub const PAD_BYTE: u8 = b'\n';

/// Upper bound on the number of fields, the field count is a single byte.
pub const MAX_FIELDS: usize = 255;

/// Width of a field-name cell in the header. Names reuse the widest
/// field width.
pub const FIELD_NAME_WIDTH: usize = 64;

// Fixed-size header prefix: magic + record count + field count.
const HEADER_PREFIX_SIZE: usize = 4 + 8 + 1;
const RECORD_COUNT_OFFSET: u64 = 4;

#[derive(Error, Debug, Eq, PartialEq, Clone)]
pub enum Error {
    #[error("could not operate on file {0}: {1}")]
    Io(String, String),

    #[error("data buffer is too small, expect {expect}, got {got}")]
    TooSmallData { expect: usize, got: usize },

    #[error("file magic is invalid, expect {expect:02x?}, got {got:02x?}")]
    InvalidMagic { expect: [u8; 4], got: [u8; 4] },

    #[error("at most {max} fields are supported, got {got}")]
    TooManyFields { max: usize, got: usize },

    #[error("length of fields {fields} and field types {types} not corresponding")]
    FieldArityMismatch { fields: usize, types: usize },

    #[error("field type code is invalid, expect one of 0, 1 or 2, got {0}")]
    InvalidFieldType(u8),

    #[error("field name {name} is {got} bytes, the limit is {max}")]
    FieldNameTooLong { name: String, max: usize, got: usize },

    #[error("value for field {field} is {got} bytes, exceeds width {width}")]
    ValueTooLong {
        field: String,
        width: usize,
        got: usize,
    },

    #[error("record has {got} fields, file declares {expect}")]
    RecordArityMismatch { expect: usize, got: usize },

    #[error("record field {got} at position {position} does not match file field {expect}")]
    FieldMismatch {
        position: usize,
        expect: String,
        got: String,
    },

    #[error("file ends inside a record, expect {expect} bytes, got {got}")]
    TruncatedRecord { expect: usize, got: usize },

    #[error("field data at position {position} is not valid utf-8")]
    InvalidUtf8 { position: usize },
}

fn io_error(path: &str, err: std::io::Error) -> Error {
    Error::Io(path.to_string(), err.to_string())
}

/// Size class of a field. The on-disk code is the discriminant used in
/// the header's field-type vector.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FieldType {
    /// 16-byte cell.
    Small,
    /// 32-byte cell.
    Medium,
    /// 64-byte cell.
    Large,
}

impl FieldType {
    /// The fixed width of a cell of this type, in bytes.
    pub fn width(self) -> usize {
        match self {
            FieldType::Small => 16,
            FieldType::Medium => 32,
            FieldType::Large => 64,
        }
    }

    /// The on-disk type code.
    pub fn code(self) -> u8 {
        match self {
            FieldType::Small => 0,
            FieldType::Medium => 1,
            FieldType::Large => 2,
        }
    }
}

impl TryFrom<u8> for FieldType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(FieldType::Small),
            1 => Ok(FieldType::Medium),
            2 => Ok(FieldType::Large),
            other => Err(Error::InvalidFieldType(other)),
        }
    }
}

/// One record of a record file: field values keyed by name, in the
/// file's declared field order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FileRecord {
    pub pairs: Vec<(String, String)>,
}

impl FileRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// In-memory copy of a record file's header.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Header {
    pub record_count: u64,
    pub fields: Vec<String>,
    pub field_types: Vec<FieldType>,
}

impl Header {
    /// Total size of the encoded header in bytes.
    pub fn size(&self) -> usize {
        HEADER_PREFIX_SIZE + self.fields.len() + FIELD_NAME_WIDTH * self.fields.len()
    }

    /// Width of a single data record.
    pub fn record_width(&self) -> usize {
        self.field_types.iter().map(|t| t.width()).sum()
    }

    fn encode(&self) -> Vec<u8> {
        let mut b = Vec::with_capacity(self.size());
        b.extend_from_slice(&MAGIC_NUMBER);
        b.extend_from_slice(&self.record_count.to_be_bytes());
        b.push(self.fields.len() as u8);
        for field_type in &self.field_types {
            b.push(field_type.code());
        }
        for name in &self.fields {
            b.extend_from_slice(name.as_bytes());
            b.resize(b.len() + FIELD_NAME_WIDTH - name.len(), PAD_BYTE);
        }
        b
    }

    fn decode(data: &[u8]) -> Result<Self, Error> {
        if data.len() < HEADER_PREFIX_SIZE {
            return Err(Error::TooSmallData {
                expect: HEADER_PREFIX_SIZE,
                got: data.len(),
            });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[0..4]);
        if magic != MAGIC_NUMBER {
            return Err(Error::InvalidMagic {
                expect: MAGIC_NUMBER,
                got: magic,
            });
        }

        let mut count = [0u8; 8];
        count.copy_from_slice(&data[4..12]);
        let record_count = u64::from_be_bytes(count);

        let field_count = data[12] as usize;
        let expect = HEADER_PREFIX_SIZE + field_count + FIELD_NAME_WIDTH * field_count;
        if data.len() < expect {
            return Err(Error::TooSmallData {
                expect,
                got: data.len(),
            });
        }

        let mut field_types = Vec::with_capacity(field_count);
        for &code in &data[HEADER_PREFIX_SIZE..HEADER_PREFIX_SIZE + field_count] {
            field_types.push(FieldType::try_from(code)?);
        }

        let mut fields = Vec::with_capacity(field_count);
        let names_start = HEADER_PREFIX_SIZE + field_count;
        for position in 0..field_count {
            let start = names_start + position * FIELD_NAME_WIDTH;
            let cell = &data[start..start + FIELD_NAME_WIDTH];
            let name = std::str::from_utf8(strip_pad(cell))
                .map_err(|_| Error::InvalidUtf8 { position })?;
            fields.push(name.to_string());
        }

        Ok(Header {
            record_count,
            fields,
            field_types,
        })
    }
}

fn strip_pad(cell: &[u8]) -> &[u8] {
    match cell.iter().position(|&b| b == PAD_BYTE) {
        Some(end) => &cell[..end],
        None => cell,
    }
}

fn read_header(file: &mut File, path: &str) -> Result<Header, Error> {
    let mut prefix = [0u8; HEADER_PREFIX_SIZE];
    file.read_exact(&mut prefix)
        .map_err(|e| io_error(path, e))?;

    // Check the magic before trusting the field count byte.
    let mut magic = [0u8; 4];
    magic.copy_from_slice(&prefix[0..4]);
    if magic != MAGIC_NUMBER {
        return Err(Error::InvalidMagic {
            expect: MAGIC_NUMBER,
            got: magic,
        });
    }

    let field_count = prefix[12] as usize;
    let mut rest = vec![0u8; field_count + FIELD_NAME_WIDTH * field_count];
    file.read_exact(&mut rest).map_err(|e| io_error(path, e))?;

    let mut data = prefix.to_vec();
    data.extend_from_slice(&rest);
    Header::decode(&data)
}

/// Creates a record file at `path` with the given schema and zero
/// records, truncating any existing file.
pub fn create<P: AsRef<Path>>(
    path: P,
    fields: &[&str],
    field_types: &[FieldType],
) -> Result<(), Error> {
    let path_str = path.as_ref().display().to_string();

    if fields.len() > MAX_FIELDS {
        return Err(Error::TooManyFields {
            max: MAX_FIELDS,
            got: fields.len(),
        });
    }
    if fields.len() != field_types.len() {
        return Err(Error::FieldArityMismatch {
            fields: fields.len(),
            types: field_types.len(),
        });
    }
    for name in fields {
        if name.len() > FIELD_NAME_WIDTH {
            return Err(Error::FieldNameTooLong {
                name: name.to_string(),
                max: FIELD_NAME_WIDTH,
                got: name.len(),
            });
        }
    }

    let header = Header {
        record_count: 0,
        fields: fields.iter().map(|f| f.to_string()).collect(),
        field_types: field_types.to_vec(),
    };

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path.as_ref())
        .map_err(|e| io_error(&path_str, e))?;
    file.write_all(&header.encode())
        .map_err(|e| io_error(&path_str, e))?;

    Ok(())
}

/// Sequential reader over a record file's data records.
///
/// The reader owns its file handle; dropping it releases the handle.
#[derive(Debug)]
pub struct Reader {
    file: File,
    path: String,
    header: Header,
}

impl Reader {
    /// Opens `path`, verifies the magic number and loads the header.
    /// The cursor is left at the first data record.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Reader, Error> {
        let path_str = path.as_ref().display().to_string();
        let mut file = File::open(path.as_ref()).map_err(|e| io_error(&path_str, e))?;
        let header = read_header(&mut file, &path_str)?;
        Ok(Reader {
            file,
            path: path_str,
            header,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Reads the next record, or `None` at end of file.
    ///
    /// A zero-byte read at a record boundary is end-of-stream; a
    /// partial record is an error.
    pub fn read(&mut self) -> Result<Option<FileRecord>, Error> {
        let width = self.header.record_width();
        if width == 0 {
            return Ok(None);
        }

        let mut buf = vec![0u8; width];
        let mut filled = 0;
        while filled < width {
            let n = self
                .file
                .read(&mut buf[filled..])
                .map_err(|e| io_error(&self.path, e))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < width {
            return Err(Error::TruncatedRecord {
                expect: width,
                got: filled,
            });
        }

        let mut record = FileRecord::new();
        let mut offset = 0;
        for (position, (name, field_type)) in self
            .header
            .fields
            .iter()
            .zip(self.header.field_types.iter())
            .enumerate()
        {
            let cell = &buf[offset..offset + field_type.width()];
            let value = std::str::from_utf8(strip_pad(cell))
                .map_err(|_| Error::InvalidUtf8 { position })?;
            record.push(name.clone(), value);
            offset += field_type.width();
        }
        Ok(Some(record))
    }

    /// Seeks back to the first data record, so the file can be scanned
    /// again from the start.
    pub fn rewind(&mut self) -> Result<(), Error> {
        self.file
            .seek(SeekFrom::Start(self.header.size() as u64))
            .map_err(|e| io_error(&self.path, e))?;
        Ok(())
    }
}

/// Append-only writer for a record file.
///
/// Every successful write also rewrites the record count in the header,
/// so the count is durable without an explicit flush step.
pub struct Writer {
    file: File,
    path: String,
    header: Header,
}

impl Writer {
    /// Opens an existing record file for appending.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Writer, Error> {
        let path_str = path.as_ref().display().to_string();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.as_ref())
            .map_err(|e| io_error(&path_str, e))?;
        let header = read_header(&mut file, &path_str)?;
        file.seek(SeekFrom::End(0))
            .map_err(|e| io_error(&path_str, e))?;
        Ok(Writer {
            file,
            path: path_str,
            header,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Appends one record. The record's keys must equal the file's
    /// field names, in declared order, and every value must fit its
    /// field's width.
    pub fn write(&mut self, record: &FileRecord) -> Result<(), Error> {
        if record.pairs.len() != self.header.fields.len() {
            return Err(Error::RecordArityMismatch {
                expect: self.header.fields.len(),
                got: record.pairs.len(),
            });
        }

        let mut encoded = Vec::with_capacity(self.header.record_width());
        for (position, ((key, value), (name, field_type))) in record
            .pairs
            .iter()
            .zip(self.header.fields.iter().zip(self.header.field_types.iter()))
            .enumerate()
        {
            if key != name {
                return Err(Error::FieldMismatch {
                    position,
                    expect: name.clone(),
                    got: key.clone(),
                });
            }
            let width = field_type.width();
            if value.len() > width {
                return Err(Error::ValueTooLong {
                    field: name.clone(),
                    width,
                    got: value.len(),
                });
            }
            encoded.extend_from_slice(value.as_bytes());
            encoded.resize(encoded.len() + width - value.len(), PAD_BYTE);
        }

        self.file
            .write_all(&encoded)
            .map_err(|e| io_error(&self.path, e))?;

        // Rewind to the count field, bump it, and return to the end for
        // the next append.
        self.header.record_count += 1;
        self.file
            .seek(SeekFrom::Start(RECORD_COUNT_OFFSET))
            .map_err(|e| io_error(&self.path, e))?;
        self.file
            .write_all(&self.header.record_count.to_be_bytes())
            .map_err(|e| io_error(&self.path, e))?;
        self.file
            .seek(SeekFrom::End(0))
            .map_err(|e| io_error(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch(name: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        (dir, path)
    }

    fn movie_record(id: &str, title: &str, genres: &str) -> FileRecord {
        let mut record = FileRecord::new();
        record.push("movieId", id);
        record.push("title", title);
        record.push("genres", genres);
        record
    }

    #[test]
    fn test_create_header_layout() {
        let (_dir, path) = scratch("movies");
        create(
            &path,
            &["movieId", "title", "genres"],
            &[FieldType::Small, FieldType::Large, FieldType::Medium],
        )
        .unwrap();

        let data = fs::read(&path).unwrap();

        let mut expect = Vec::new();
        expect.extend_from_slice(&[0x31, 0x08, 0x19, 0x98]); // magic
        expect.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]); // record count
        expect.push(3); // field count
        expect.extend_from_slice(&[0, 2, 1]); // field types
        for name in ["movieId", "title", "genres"] {
            expect.extend_from_slice(name.as_bytes());
            expect.resize(expect.len() + FIELD_NAME_WIDTH - name.len(), PAD_BYTE);
        }
        assert_eq!(data, expect);

        let reader = Reader::open(&path).unwrap();
        assert_eq!(reader.header().record_count, 0);
        assert_eq!(reader.header().fields, vec!["movieId", "title", "genres"]);
        assert_eq!(
            reader.header().field_types,
            vec![FieldType::Small, FieldType::Large, FieldType::Medium]
        );
    }

    #[test]
    fn test_field_type_codes() {
        assert_eq!(FieldType::try_from(0).unwrap(), FieldType::Small);
        assert_eq!(FieldType::try_from(1).unwrap(), FieldType::Medium);
        assert_eq!(FieldType::try_from(2).unwrap(), FieldType::Large);
        assert_eq!(FieldType::Small.width(), 16);
        assert_eq!(FieldType::Medium.width(), 32);
        assert_eq!(FieldType::Large.width(), 64);
        assert_eq!(FieldType::try_from(3), Err(Error::InvalidFieldType(3)));
    }

    #[test]
    fn test_create_too_many_fields() {
        let (_dir, path) = scratch("wide");
        let names: Vec<String> = (0..256).map(|i| format!("f{i}")).collect();
        let names: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let types = vec![FieldType::Small; 256];
        let result = create(&path, &names, &types);
        assert_eq!(
            result.unwrap_err(),
            Error::TooManyFields { max: 255, got: 256 }
        );
    }

    #[test]
    fn test_create_arity_mismatch() {
        let (_dir, path) = scratch("mismatch");
        let result = create(&path, &["a", "b"], &[FieldType::Small]);
        assert_eq!(
            result.unwrap_err(),
            Error::FieldArityMismatch { fields: 2, types: 1 }
        );
    }

    #[test]
    fn test_read_write_round_trip() {
        let (_dir, path) = scratch("movies");
        create(
            &path,
            &["movieId", "title", "genres"],
            &[FieldType::Small, FieldType::Large, FieldType::Medium],
        )
        .unwrap();

        let r1 = movie_record("123", "Love You Zindagi", "Romance");
        let r2 = movie_record("124", "Sholay", "Comedy | Romance");
        let r3 = movie_record("125", "Chole", "Food | Thriller");

        let mut writer = Writer::open(&path).unwrap();
        writer.write(&r1).unwrap();
        writer.write(&r2).unwrap();
        writer.write(&r3).unwrap();
        drop(writer);

        let mut reader = Reader::open(&path).unwrap();
        assert_eq!(reader.header().record_count, 3);
        assert_eq!(reader.read().unwrap(), Some(r1));
        assert_eq!(reader.read().unwrap(), Some(r2));
        assert_eq!(reader.read().unwrap(), Some(r3));
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn test_rewind_rescans_from_first_record() {
        let (_dir, path) = scratch("movies");
        create(&path, &["movieId"], &[FieldType::Small]).unwrap();

        let mut writer = Writer::open(&path).unwrap();
        let mut record = FileRecord::new();
        record.push("movieId", "7");
        writer.write(&record).unwrap();
        drop(writer);

        let mut reader = Reader::open(&path).unwrap();
        assert_eq!(reader.read().unwrap(), Some(record.clone()));
        assert_eq!(reader.read().unwrap(), None);
        reader.rewind().unwrap();
        assert_eq!(reader.read().unwrap(), Some(record));
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn test_write_value_too_long() {
        let (_dir, path) = scratch("movies");
        create(&path, &["movieId"], &[FieldType::Small]).unwrap();

        let mut writer = Writer::open(&path).unwrap();
        let mut record = FileRecord::new();
        record.push("movieId", "01234567890123456"); // 17 bytes into a 16-byte cell
        assert_eq!(
            writer.write(&record).unwrap_err(),
            Error::ValueTooLong {
                field: "movieId".to_string(),
                width: 16,
                got: 17,
            }
        );
    }

    #[test]
    fn test_write_field_mismatch() {
        let (_dir, path) = scratch("movies");
        create(&path, &["movieId"], &[FieldType::Small]).unwrap();

        let mut writer = Writer::open(&path).unwrap();
        let mut record = FileRecord::new();
        record.push("title", "Sholay");
        assert_eq!(
            writer.write(&record).unwrap_err(),
            Error::FieldMismatch {
                position: 0,
                expect: "movieId".to_string(),
                got: "title".to_string(),
            }
        );
    }

    #[test]
    fn test_open_invalid_magic() {
        let (_dir, path) = scratch("junk");
        fs::write(&path, b"not a record file").unwrap();
        let result = Reader::open(&path);
        assert_eq!(
            result.unwrap_err(),
            Error::InvalidMagic {
                expect: MAGIC_NUMBER,
                got: [b'n', b'o', b't', b' '],
            }
        );
    }

    #[test]
    fn test_truncated_record() {
        let (_dir, path) = scratch("movies");
        create(&path, &["movieId"], &[FieldType::Small]).unwrap();

        let mut writer = Writer::open(&path).unwrap();
        let mut record = FileRecord::new();
        record.push("movieId", "9");
        writer.write(&record).unwrap();
        drop(writer);

        let full = fs::metadata(&path).unwrap().len();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(full - 4).unwrap();
        drop(file);

        let mut reader = Reader::open(&path).unwrap();
        assert_eq!(
            reader.read().unwrap_err(),
            Error::TruncatedRecord { expect: 16, got: 12 }
        );
    }

    #[test]
    fn test_zero_field_file() {
        let (_dir, path) = scratch("empty");
        create(&path, &[], &[]).unwrap();

        let mut reader = Reader::open(&path).unwrap();
        assert_eq!(reader.header().record_count, 0);
        assert_eq!(reader.header().record_width(), 0);
        assert_eq!(reader.read().unwrap(), None);
    }
}
