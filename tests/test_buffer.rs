use edgehog::http::buffer::{BufferError, RecvBuffer};

#[test]
fn test_append_accumulates_in_order() {
    let mut buf = RecvBuffer::new(8);
    buf.append(b"GET ").unwrap();
    buf.append(b"/index").unwrap();
    buf.append(b".html").unwrap();

    assert_eq!(buf.len(), 15);
    assert_eq!(buf.bytes(), b"GET /index.html");
}

#[test]
fn test_length_equals_sum_of_appends() {
    let chunks: Vec<&[u8]> = vec![b"ab", b"cdef", b"g", b"", b"hijklmno"];
    let expected: Vec<u8> = chunks.concat();

    let mut buf = RecvBuffer::new(16);
    for chunk in &chunks {
        buf.append(chunk).unwrap();
    }

    assert_eq!(buf.len(), expected.len());
    assert_eq!(buf.bytes(), &expected[..]);
}

#[test]
fn test_grows_by_one_chunk_when_chunk_area_fills() {
    let mut buf = RecvBuffer::new(4);
    assert_eq!(buf.chunks(), 1);

    buf.append(b"abc").unwrap();
    assert_eq!(buf.chunks(), 1);

    // Reaching the chunk boundary allocates exactly one more chunk.
    buf.append(b"d").unwrap();
    assert_eq!(buf.chunks(), 2);

    buf.append(b"efgh").unwrap();
    assert_eq!(buf.chunks(), 3);
    assert_eq!(buf.bytes(), b"abcdefgh");
}

#[test]
fn test_oversized_append_is_recoverable() {
    let mut buf = RecvBuffer::new(4);
    buf.append(b"ab").unwrap();

    let err = buf.append(b"toolarge").unwrap_err();
    assert!(matches!(
        err,
        BufferError::OversizedAppend { len: 8, chunk_size: 4 }
    ));

    // The failed append must not corrupt the accumulated bytes.
    assert_eq!(buf.bytes(), b"ab");
    buf.append(b"cd").unwrap();
    assert_eq!(buf.bytes(), b"abcd");
}

#[test]
fn test_append_up_to_chunk_size_is_accepted() {
    let mut buf = RecvBuffer::new(4);
    buf.append(b"abcd").unwrap();
    assert_eq!(buf.len(), 4);
}

#[test]
fn test_into_bytes_hands_over_the_accumulated_request() {
    let mut buf = RecvBuffer::new(8);
    buf.append(b"GET / HT").unwrap();
    buf.append(b"TP/1.1").unwrap();

    let bytes = buf.into_bytes();
    assert_eq!(&bytes[..], b"GET / HTTP/1.1");
}

#[test]
fn test_new_buffer_is_empty() {
    let buf = RecvBuffer::new(16);
    assert!(buf.is_empty());
    assert_eq!(buf.len(), 0);
    assert_eq!(buf.chunks(), 1);
}
