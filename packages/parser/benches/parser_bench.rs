use chartpatch_parser::{generate_patch, parse_document};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const DOC: &str = r#"<!DOCTYPE html>
<html>
<head>
  <script src="https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js"></script>
  <style>body { margin: 0; }</style>
</head>
<body>
  <h1>Monthly Traffic</h1>
  <div id="chart" style="width: 800px; height: 600px;"></div>
  <script>
    const chart = echarts.init(document.getElementById('chart'));
    const option = {
      title: { text: 'Monthly Traffic', subtext: 'sessions' },
      legend: { show: true },
      tooltip: { show: true },
      xAxis: { type: 'category', data: ['Jan', 'Feb', 'Mar', 'Apr', 'May', 'Jun'] },
      yAxis: { type: 'value' },
      series: [
        { type: 'line', name: 'Organic', data: [820, 932, 901, 934, 1290, 1330] },
        { type: 'line', name: 'Paid', data: [320, 332, 301, 334, 390, 330] },
        { type: 'bar', name: 'Referral', data: [120, 132, 101, 134, 90, 230] }
      ]
    };
    chart.setOption(option);
  </script>
</body>
</html>"#;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_document", |b| {
        b.iter(|| parse_document(black_box(DOC)).unwrap())
    });

    let parsed = parse_document(DOC).unwrap();
    c.bench_function("generate_patch", |b| {
        b.iter(|| generate_patch(black_box(DOC), &parsed, &parsed.config))
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
