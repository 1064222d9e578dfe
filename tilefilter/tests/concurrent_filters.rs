use pretty_assertions::assert_eq;
use std::thread;
use tilefilter::{
	Counting, DecodeOptions, LayerMaps,
	pipeline::{filter_layers, prefilter_features},
};
use tilefilter_core::TileCoord;
use tilefilter_geometry::{Draw, GeomType, KeyPool, SerialFeature, TileFeature, TileLayer, TileValue};

fn points(count: i64, layer: u32) -> Vec<SerialFeature> {
	(0..count)
		.map(|i| {
			let mut feature = SerialFeature::new(GeomType::Point, vec![Draw::move_to(i * 16, -i * 16)], layer);
			feature.sequence = i as u64;
			feature
		})
		.collect()
}

#[test]
fn workers_filter_in_parallel() {
	let key_pool = KeyPool::new();
	let mut maps = LayerMaps::new(4);

	thread::scope(|scope| {
		for segment in maps.iter_mut() {
			let key_pool = &key_pool;
			scope.spawn(move || {
				let coord = TileCoord::new(12, 2000 + segment.index() as u32, 1300).unwrap();
				let layer = segment.resolve_or_create("points", 12);
				let features = points(25_000, layer);
				let result = prefilter_features(
					"cat",
					&coord,
					&features,
					segment,
					key_pool,
					Counting::Record,
					DecodeOptions::default(),
				)
				.unwrap();
				assert_eq!(result.len(), features.len());
				assert_eq!(result.last().unwrap().sequence, 24_999);
				assert_eq!(result.last().unwrap().geometry, features.last().unwrap().geometry);
			});
		}
	});

	let merged = maps.merge();
	assert_eq!(merged.len(), 1);
	assert_eq!(merged.get("points").unwrap().points, 100_000);
}

#[test]
fn geometry_scale_is_applied_to_filter_output() {
	let key_pool = KeyPool::new();
	let mut maps = LayerMaps::new(1);
	let segment = maps.segment_mut(0).unwrap();
	let coord = TileCoord::new(10, 500, 300).unwrap();
	let layer = segment.resolve_or_create("points", 10);
	let features = vec![SerialFeature::new(GeomType::Point, vec![Draw::move_to(1000, 3000)], layer)];

	let options = DecodeOptions { geometry_scale: 10 };
	let result = prefilter_features("cat", &coord, &features, segment, &key_pool, Counting::Record, options).unwrap();
	assert_eq!(result[0].geometry, vec![Draw::move_to(1024, 3072)]);
}

#[test]
fn postfilter_can_move_features_between_layers() {
	let coord = TileCoord::new(6, 33, 21).unwrap();
	let mut layer = TileLayer::new("roads", 4096);
	for i in 0..3 {
		let mut feature = TileFeature::new(
			GeomType::LineString,
			vec![Draw::move_to(0, i * 100), Draw::line_to(4096, i * 100)],
		);
		layer.tag(&mut feature, "rank", TileValue::UInt(i as u64));
		layer.features.push(feature);
	}

	let mut maps = LayerMaps::new(1);
	let segment = maps.segment_mut(0).unwrap();
	let result = filter_layers(
		"sed 's/\"layer\":\"roads\"/\"layer\":\"paths\"/'",
		&[layer],
		&coord,
		segment,
		4096,
	)
	.unwrap();

	assert_eq!(result.len(), 1);
	assert_eq!(result[0].name, "paths");
	assert_eq!(result[0].features.len(), 3);
	assert_eq!(result[0].features[2].geometry, vec![Draw::move_to(0, 200), Draw::line_to(4096, 200)]);
	assert!(segment.get("roads").is_none());
	assert_eq!(segment.get("paths").unwrap().lines, 3);
}
