//! `Scrape` response for the HTTP tracker.
//!
//! A bencoded dictionary with one `files` entry per requested torrent, keyed
//! by the raw 20-byte info-hash.
//!
//! Refer to [BEP 48: Tracker Protocol Extension: Scrape](https://www.bittorrent.org/beps/bep_0048.html).
use std::collections::BTreeMap;

use storrent_bencode::{ben_int, ben_map, Bencode};

use crate::core::ScrapeData;

#[derive(Debug, PartialEq)]
pub struct Scrape {
    pub scrape_data: ScrapeData,
}

impl Scrape {
    /// Returns the bencoded body of the scrape response.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        let mut files: BTreeMap<Vec<u8>, Bencode> = BTreeMap::new();

        for (info_hash, metadata) in &self.scrape_data.files {
            files.insert(
                info_hash.bytes().to_vec(),
                ben_map! {
                    "complete" => ben_int!(i64::from(metadata.complete)),
                    "downloaded" => ben_int!(i64::from(metadata.downloaded)),
                    "incomplete" => ben_int!(i64::from(metadata.incomplete))
                },
            );
        }

        (ben_map! {
            "files" => Bencode::Dict(files)
        })
        .encode()
    }
}

impl From<ScrapeData> for Scrape {
    fn from(scrape_data: ScrapeData) -> Self {
        Self { scrape_data }
    }
}
