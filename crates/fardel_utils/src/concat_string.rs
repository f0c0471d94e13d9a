/// Concatenates string-like values with a single allocation.
#[macro_export]
macro_rules! concat_string {
  () => {
    String::new()
  };
  ($($s:expr),+ $(,)?) => {{
    let len = 0 $(+ AsRef::<str>::as_ref(&$s).len())+;
    let mut buf = String::with_capacity(len);
    $(buf.push_str(AsRef::<str>::as_ref(&$s));)+
    buf
  }};
}

#[test]
fn test_concat_string() {
  let owned = String::from("b");
  assert_eq!(concat_string!("a", owned, "c"), "abc");
  assert_eq!(concat_string!(), "");
}
