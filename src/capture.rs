// Packet source: legacy pcap capture files.
//
// Thin wrapper over the pcap-file reader that yields frames in file order
// and maps open/read failures into the crate's error type. The core treats
// the file purely as an ordered stream of frames; timestamps are carried by
// the records but unused by the evaluation.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use pcap_file::pcap::{PcapPacket, PcapReader};

use crate::error::DiffError;

/// Sequential frame source backed by a pcap capture.
#[derive(Debug)]
pub struct PacketSource<R: Read> {
    reader: PcapReader<R>,
    path: String,
}

impl PacketSource<BufReader<File>> {
    /// Open a capture file for offline processing.
    pub fn open(path: &Path) -> Result<Self, DiffError> {
        let display = path.display().to_string();
        let file = File::open(path).map_err(|e| DiffError::Capture {
            path: display.clone(),
            detail: e.to_string(),
        })?;
        Self::from_reader(BufReader::new(file), display)
    }
}

impl<R: Read> PacketSource<R> {
    /// Wrap any byte stream holding a pcap document. `label` names the
    /// source in error messages.
    pub fn from_reader(reader: R, label: String) -> Result<Self, DiffError> {
        let reader = PcapReader::new(reader).map_err(|e| DiffError::Capture {
            path: label.clone(),
            detail: e.to_string(),
        })?;
        Ok(Self {
            reader,
            path: label,
        })
    }

    /// Next frame record in file order, or `None` at end of capture.
    /// A mid-stream read failure is fatal (the packet source failed).
    pub fn next_packet(&mut self) -> Option<Result<PcapPacket<'_>, DiffError>> {
        let path = self.path.clone();
        self.reader.next_packet().map(|res| {
            res.map_err(|e| DiffError::Capture {
                path,
                detail: e.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    use pcap_file::pcap::PcapWriter;

    #[test]
    fn yields_packets_in_file_order() {
        let mut writer = PcapWriter::new(Vec::new()).unwrap();
        for i in 0..3u8 {
            let data = vec![i; 20];
            let packet = PcapPacket::new(Duration::from_secs(i as u64), 20, &data);
            writer.write_packet(&packet).unwrap();
        }
        let bytes = writer.into_writer();

        let mut source =
            PacketSource::from_reader(Cursor::new(bytes), "<memory>".to_string()).unwrap();
        for i in 0..3u8 {
            let pkt = source.next_packet().unwrap().unwrap();
            assert_eq!(pkt.orig_len, 20);
            assert_eq!(pkt.data[0], i);
        }
        assert!(source.next_packet().is_none());
    }

    #[test]
    fn garbage_header_is_a_capture_error() {
        let err =
            PacketSource::from_reader(Cursor::new(vec![0u8; 8]), "<memory>".to_string())
                .unwrap_err();
        assert!(matches!(err, DiffError::Capture { .. }));
    }

    #[test]
    fn missing_file_is_a_capture_error() {
        let err = PacketSource::open(Path::new("/nonexistent/capture.pcap")).unwrap_err();
        assert!(matches!(err, DiffError::Capture { .. }));
    }
}
