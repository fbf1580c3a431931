//! Package framing.
//!
//! Header layout (8 bytes, little-endian):
//!
//! | bytes | field  | meaning                          |
//! |-------|--------|----------------------------------|
//! | 0..4  | size   | payload length                   |
//! | 4..6  | pid    | caller-correlation id            |
//! | 6     | tp     | package type                     |
//! | 7     | check  | `tp ^ 0xff`                      |

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::{FrameError, Package};

/// Size of the package header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Encodes a package into a single buffer.
pub fn encode(pkg: &Package) -> Result<Vec<u8>, FrameError> {
    let size = u32::try_from(pkg.data.len()).map_err(|_| FrameError::TooLarge(pkg.data.len()))?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + pkg.data.len());
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(&pkg.pid.to_le_bytes());
    buf.push(pkg.tp);
    buf.push(pkg.tp ^ 0xff);
    buf.extend_from_slice(&pkg.data);
    Ok(buf)
}

/// Reads the next package from `reader`.
///
/// Returns `Ok(None)` when the stream ends cleanly between packages.
///
/// # Errors
///
/// Returns `FrameError::InvalidHeader` on a bad check byte and
/// `FrameError::Io` on a read failure, including a stream that ends
/// mid-package.
pub async fn read_package<R>(reader: &mut R) -> Result<Option<Package>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_SIZE];
    let n = reader.read(&mut header).await?;
    if n == 0 {
        return Ok(None);
    }
    reader.read_exact(&mut header[n..]).await?;

    let size = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let pid = u16::from_le_bytes([header[4], header[5]]);
    let tp = header[6];
    let check = header[7];

    if tp ^ 0xff != check {
        return Err(FrameError::InvalidHeader { tp, check });
    }

    let mut data = vec![0u8; size];
    reader.read_exact(&mut data).await?;

    Ok(Some(Package { pid, tp, data }))
}

/// Writes `pkg` to `writer` and flushes.
pub async fn write_package<W>(writer: &mut W, pkg: &Package) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let buf = encode(pkg)?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Proto;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_header_layout() {
        let pkg = Package::new(0x0102, Proto::ModuleRes, vec![0xc0]);
        let buf = encode(&pkg).unwrap();
        assert_eq!(buf, vec![1, 0, 0, 0, 0x02, 0x01, 81, 81 ^ 0xff, 0xc0]);
    }

    #[tokio::test]
    async fn test_read_package() {
        let pkg = Package::new(9, Proto::ModuleReq, vec![1, 2, 3]);
        let buf = encode(&pkg).unwrap();
        let mut reader = &buf[..];

        assert_eq!(read_package(&mut reader).await.unwrap(), Some(pkg));
        assert_eq!(read_package(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_package_rejects_bad_check() {
        let mut buf = encode(&Package::new(1, Proto::ModuleReq, Vec::new())).unwrap();
        buf[7] = 0;
        let mut reader = &buf[..];

        let err = read_package(&mut reader).await.unwrap_err();
        assert!(matches!(err, FrameError::InvalidHeader { tp: 80, check: 0 }));
    }

    #[tokio::test]
    async fn test_read_package_truncated_payload() {
        let mut buf = encode(&Package::new(1, Proto::ModuleReq, vec![1, 2, 3, 4])).unwrap();
        buf.truncate(HEADER_SIZE + 2);
        let mut reader = &buf[..];

        let err = read_package(&mut reader).await.unwrap_err();
        assert!(matches!(err, FrameError::Io(_)));
    }

    #[tokio::test]
    async fn test_read_package_truncated_header() {
        let buf = [1u8, 0, 0];
        let mut reader = &buf[..];

        let err = read_package(&mut reader).await.unwrap_err();
        assert!(matches!(err, FrameError::Io(_)));
    }

    #[tokio::test]
    async fn test_write_package() {
        let pkg = Package::conf_ok(4);
        let expected = encode(&pkg).unwrap();
        let mut writer = tokio_test::io::Builder::new().write(&expected).build();

        write_package(&mut writer, &pkg).await.unwrap();
    }
}
