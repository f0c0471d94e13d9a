use super::source::Source;

#[derive(Default)]
pub struct SourceJoiner<'source> {
  inner: Vec<Box<dyn Source + Send + 'source>>,
  prepend_source: Vec<Box<dyn Source + Send + 'source>>,
}

impl<'source> SourceJoiner<'source> {
  pub fn append_source<T: Source + Send + 'source>(&mut self, source: T) {
    self.inner.push(Box::new(source));
  }

  pub fn prepend_source<T: Source + Send + 'source>(&mut self, source: T) {
    self.prepend_source.push(Box::new(source));
  }

  pub fn is_empty(&self) -> bool {
    self.inner.is_empty() && self.prepend_source.is_empty()
  }

  pub fn join(&self) -> String {
    let sources_len = self.prepend_source.len() + self.inner.len();
    if sources_len == 0 {
      return String::new();
    }
    let sources_iter = self.prepend_source.iter().chain(self.inner.iter()).enumerate();

    let size_hint = sources_iter.clone().map(|(_, source)| source.content().len()).sum::<usize>()
      + /* a '\n' between two sources */ (sources_len - 1);
    let mut ret_source = String::with_capacity(size_hint);

    for (index, source) in sources_iter {
      ret_source.push_str(source.content());
      if index < sources_len - 1 {
        ret_source.push('\n');
      }
    }

    ret_source
  }
}

#[test]
fn prepended_sources_come_first() {
  let mut joiner = SourceJoiner::default();
  joiner.append_source("b");
  joiner.append_source(String::from("c"));
  joiner.prepend_source("a");
  assert_eq!(joiner.join(), "a\nb\nc");
  assert_eq!(SourceJoiner::default().join(), "");
}
