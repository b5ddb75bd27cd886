use std::{
    fs::File,
    io::{self, Cursor, Read},
    path::Path,
};

use rand::{thread_rng, RngCore};

struct Part {
    head: Vec<u8>,
    body: Box<dyn Read + Send>,
    len: u64,
}

/// A streaming `multipart/form-data` body with a known length.
pub struct Form {
    boundary: String,
    parts: Vec<Part>,
}

impl Form {
    pub fn new() -> Self {
        Self {
            boundary: format!("{:016x}", thread_rng().next_u64()),
            parts: Vec::new(),
        }
    }

    pub fn text(&mut self, name: &str, content_type: &str, value: String) {
        let head = self.part_head(name, None, content_type);
        let len = value.len() as u64;
        self.parts.push(Part {
            head,
            body: Box::new(Cursor::new(value.into_bytes())),
            len,
        });
    }

    /// Add a file part. The file is opened now so a bad path fails before
    /// anything is sent.
    pub fn file(&mut self, name: &str, path: &Path) -> io::Result<()> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().replace('"', "'"))
            .unwrap_or_else(|| "file".into());
        let head = self.part_head(name, Some(&filename), "application/octet-stream");
        self.parts.push(Part {
            head,
            body: Box::new(file),
            len,
        });
        Ok(())
    }

    fn part_head(&self, name: &str, filename: Option<&str>, content_type: &str) -> Vec<u8> {
        let boundary = &self.boundary;
        let disposition = match filename {
            Some(filename) => format!("form-data; name=\"{name}\"; filename=\"{filename}\""),
            None => format!("form-data; name=\"{name}\""),
        };
        format!("--{boundary}\r\nContent-Disposition: {disposition}\r\nContent-Type: {content_type}\r\n\r\n")
            .into_bytes()
    }

    fn tail(&self) -> Vec<u8> {
        format!("--{}--\r\n", self.boundary).into_bytes()
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Exact number of bytes `into_reader` yields.
    pub fn content_length(&self) -> u64 {
        let parts: u64 = self
            .parts
            .iter()
            .map(|part| part.head.len() as u64 + part.len + 2)
            .sum();
        parts + self.tail().len() as u64
    }

    pub fn into_reader(self) -> impl Read + Send {
        let tail = self.tail();
        let mut stream: Box<dyn Read + Send> = Box::new(io::empty());
        for part in self.parts {
            stream = Box::new(
                stream
                    .chain(Cursor::new(part.head))
                    .chain(part.body.take(part.len))
                    .chain(Cursor::new(b"\r\n")),
            );
        }
        stream.chain(Cursor::new(tail))
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}
