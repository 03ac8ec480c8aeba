//! Song info lookup
//!
//! New catalog entries carry only a group and a song name. The release date,
//! lyrics and link come from an external info service:
//!
//! GET {base_url}/info?group=Muse&song=Supermassive%20Black%20Hole
//! -> {"releaseDate": "16.07.2006", "text": "...", "link": "https://..."}

pub mod client;

pub use client::SongInfoClient;
